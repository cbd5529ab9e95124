//! Reader for the headerless binary spectrum dumps written per map point.
//!
//! The file is a sequence of fixed size blocks, each holding one spectrum as
//! unsigned 16-bit counts, read until the end of the stream.

use std::io::{self, BufRead, Read};

use log::debug;

use super::error::ParserError;
use super::options::{ByteOrder, RawSpectraOptions};
use super::traits::EELSFileReader;

/// Fill `buffer` as far as the stream allows, returning the number of bytes read.
fn read_block<R: Read>(handle: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match handle.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[derive(Debug, Default, Clone)]
pub struct RawSpectraReader {
    pub options: RawSpectraOptions,
}

impl RawSpectraReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RawSpectraOptions) -> Self {
        Self { options }
    }

    /// Read the next block, or `None` at a clean end of stream. A partial
    /// block is an error.
    pub fn read_next<R: Read>(&self, handle: &mut R) -> Result<Option<Vec<u16>>, ParserError> {
        let mut counts = vec![0u16; self.options.channel_count];
        let expected = self.options.block_size();
        let read = read_block(handle, bytemuck::cast_slice_mut(&mut counts))?;
        if read == 0 {
            return Ok(None);
        }
        if read < expected {
            return Err(ParserError::TruncatedBlock { expected, read });
        }
        match self.options.byte_order {
            ByteOrder::Little => counts.iter_mut().for_each(|c| *c = u16::from_le(*c)),
            ByteOrder::Big => counts.iter_mut().for_each(|c| *c = u16::from_be(*c)),
        }
        Ok(Some(counts))
    }
}

impl EELSFileReader for RawSpectraReader {
    type Output = Vec<Vec<u16>>;

    fn read<R: BufRead>(&self, mut handle: R) -> Result<Self::Output, ParserError> {
        let mut spectra = Vec::new();
        while let Some(counts) = self.read_next(&mut handle)? {
            spectra.push(counts);
        }
        debug!("Read {} raw spectra", spectra.len());
        Ok(spectra)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn test_read_fixture() -> io::Result<()> {
        let spectra = RawSpectraReader::new().read_path("./test/data/rawspect-1.dat")?;
        assert_eq!(spectra.len(), 20);
        let spectrum = &spectra[0];
        assert_eq!(spectrum.len(), 1024);
        assert_eq!(spectrum[0], 2284);
        assert_eq!(spectrum[1023], 0);
        Ok(())
    }

    #[test]
    fn test_byte_order() -> Result<(), ParserError> {
        let bytes = [0x01u8, 0x02, 0x03, 0x04];
        let options = RawSpectraOptions::default().channel_count(2);
        let little = RawSpectraReader::with_options(options).read(&bytes[..])?;
        assert_eq!(little, vec![vec![0x0201, 0x0403]]);
        let big = RawSpectraReader::with_options(options.byte_order(ByteOrder::Big)).read(&bytes[..])?;
        assert_eq!(big, vec![vec![0x0102, 0x0304]]);
        Ok(())
    }

    #[test]
    fn test_truncated() {
        let bytes = [0u8; 6];
        let options = RawSpectraOptions::default().channel_count(2);
        let err = RawSpectraReader::with_options(options).read(&bytes[..]);
        assert!(matches!(
            err,
            Err(ParserError::TruncatedBlock {
                expected: 4,
                read: 2
            })
        ));
        let empty = RawSpectraReader::new().read(&b""[..]);
        assert!(matches!(empty, Ok(v) if v.is_empty()));
    }
}
