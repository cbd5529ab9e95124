//! Readers for the file formats written by the spectrometer software.
//!
//! Every reader implements [`EELSFileReader`], reading a whole file into a
//! record in one pass. Text formats tolerate lines they do not understand, but
//! a unit that disagrees with the one a keyword is stored in aborts the read.

pub mod ana;
pub mod batch;
pub(crate) mod compression;
pub mod csv;
pub mod elv;
mod error;
pub mod header;
mod infer_format;
mod options;
pub mod raw_spectra;
pub mod table;
pub mod text_params;
pub mod tokenize;
mod traits;
pub(crate) mod utils;

#[cfg(feature = "hdf5")]
pub mod hdf5;

pub use crate::io::ana::{AnaFile, AnaMapFile, AnaMapReader, AnaReader};
pub use crate::io::batch::{read_elv_batch, BatchEntry};
pub use crate::io::csv::{CsvFile, CsvReader};
pub use crate::io::elv::{ElvFile, ElvReader};
pub use crate::io::error::ParserError;
pub use crate::io::infer_format::{infer_format, infer_from_path, infer_from_stream, EELSFormat};
pub use crate::io::options::{ByteOrder, RawSpectraOptions, ReaderOptions, DEFAULT_CHANNEL_COUNT};
pub use crate::io::raw_spectra::RawSpectraReader;
pub use crate::io::text_params::{
    Analysis, ElvTextParameters, ElvTextReader, MapTextParameters, MapTextReader,
};
pub use crate::io::traits::EELSFileReader;
pub use crate::io::utils::FileSource;
