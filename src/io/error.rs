use std::io;

use thiserror::Error;

use crate::params::Unit;

/// Errors that abort reading a file. Lines that merely fail to parse are
/// skipped by the text readers and never produce one of these.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Unit mismatch for {keyword}: expected {}, found {found:?}", format_units(.expected))]
    UnitMismatch {
        keyword: String,
        expected: Vec<Unit>,
        found: String,
    },
    #[error("Missing required section: {0}")]
    MissingSection(String),
    #[error("Channel arrays are misaligned: {0}")]
    LengthMismatch(String),
    #[error("Malformed field {field} in row {row}: {value:?}")]
    MalformedField {
        row: usize,
        field: usize,
        value: String,
    },
    #[error("Truncated binary block: expected {expected} bytes, read {read}")]
    TruncatedBlock { expected: usize, read: usize },
    #[error("Encountered an IO error: {0}")]
    IOError(
        #[from]
        #[source]
        io::Error,
    ),
    #[error("Encountered a CSV error: {0}")]
    CSVError(
        #[from]
        #[source]
        csv::Error,
    ),
    #[cfg(feature = "hdf5")]
    #[error("An HDF5-related error occurred: {0}")]
    HDF5Error(
        #[from]
        #[source]
        hdf5::Error,
    ),
}

fn format_units(units: &[Unit]) -> String {
    units
        .iter()
        .map(|u| u.suffix())
        .collect::<Vec<_>>()
        .join(" or ")
}

impl From<ParserError> for io::Error {
    fn from(value: ParserError) -> Self {
        match value {
            ParserError::IOError(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
