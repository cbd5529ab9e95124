use std::io::BufRead;
use std::path::Path;

use log::debug;

use super::compression::open_decompressed;
use super::error::ParserError;

/// Common interface for the readers of each file format. A reader holds only
/// its settings, so one instance can read any number of files.
pub trait EELSFileReader {
    type Output;

    /// Read a complete file from `handle`.
    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError>;

    /// Open the file at `path`, decompressing it if it is GZIP compressed, and
    /// read it.
    fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Self::Output, ParserError> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let handle = open_decompressed(path)?;
        self.read(handle)
    }
}
