//! Reading many `.elv` files at once. Each file is read independently, so one
//! unreadable file does not stop the others.

use std::path::{Path, PathBuf};

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use log::debug;

use super::elv::{ElvFile, ElvReader};
use super::error::ParserError;
use super::traits::EELSFileReader;

/// The outcome of reading one file of a batch
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<ElvFile, ParserError>,
}

fn read_one(reader: &ElvReader, path: &Path) -> BatchEntry {
    let result = reader.read_path(path);
    if let Err(e) = &result {
        debug!("Failed to read {}: {e}", path.display());
    }
    BatchEntry {
        path: path.to_path_buf(),
        result,
    }
}

fn read_elv_batch_serial<P: AsRef<Path>>(reader: &ElvReader, paths: &[P]) -> Vec<BatchEntry> {
    paths.iter().map(|p| read_one(reader, p.as_ref())).collect()
}

#[cfg(feature = "parallelism")]
fn read_elv_batch_parallel<P: AsRef<Path> + Sync>(reader: &ElvReader, paths: &[P]) -> Vec<BatchEntry> {
    paths.par_iter().map(|p| read_one(reader, p.as_ref())).collect()
}

/// Read every file in `paths` with `reader`, returning one entry per path in
/// the order given.
#[cfg(not(feature = "parallelism"))]
pub fn read_elv_batch<P: AsRef<Path>>(reader: &ElvReader, paths: &[P]) -> Vec<BatchEntry> {
    read_elv_batch_serial(reader, paths)
}

/// Read every file in `paths` with `reader`, returning one entry per path in
/// the order given.
#[cfg(feature = "parallelism")]
pub fn read_elv_batch<P: AsRef<Path> + Sync>(reader: &ElvReader, paths: &[P]) -> Vec<BatchEntry> {
    if paths.len() > 2 {
        read_elv_batch_parallel(reader, paths)
    } else {
        read_elv_batch_serial(reader, paths)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn test_batch() {
        let paths = [
            "./test/data/30kV_7eV.elv",
            "./test/data/does_not_exist.elv",
            "./test/data/30kV_7eV.elv",
        ];
        let entries = read_elv_batch(&ElvReader::new(), &paths);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].result.is_ok());
        assert!(matches!(entries[1].result, Err(ParserError::IOError(_))));
        assert_eq!(entries[2].path, PathBuf::from(paths[2]));
        let first = entries[0].result.as_ref().unwrap();
        let last = entries[2].result.as_ref().unwrap();
        assert_eq!(first, last);
    }
}
