use std::fs;
use std::io::{self, prelude::*, BufReader};
use std::path;

use flate2::bufread::GzDecoder;

pub fn is_gzipped(header: &[u8]) -> bool {
    header.starts_with(b"\x1f\x8b")
}

pub fn is_gzipped_extension(path: path::PathBuf) -> (bool, path::PathBuf) {
    if let Some(ext) = path.extension() {
        if ext.to_ascii_lowercase() == "gz" {
            (true, path.with_extension(""))
        } else {
            (false, path)
        }
    } else {
        (false, path)
    }
}

/// Open the file at `path` for buffered reading, transparently decompressing
/// it if it is GZIP compressed. Compression is detected from the leading
/// magic bytes, so a misnamed file is still handled.
pub fn open_decompressed<P: AsRef<path::Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let handle = fs::File::open(path.as_ref())?;
    let mut reader = BufReader::new(handle);
    let header = reader.fill_buf()?;
    if is_gzipped(header) {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
