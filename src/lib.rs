//! `eelsdata` reads the spectrum files written by electron energy-loss
//! spectrometers, the header parameters recorded with them, and applies the
//! detector's gain and dark current calibration to the raw counts.
//!
//! ```no_run
//! use eelsdata::prelude::*;
//! use eelsdata::ElvReader;
//!
//! let elv = ElvReader::new().read_path("./test/data/30kV_7eV.elv")?;
//! let counts = elv.corrected_counts();
//! println!("{} channels, first net count {}", counts.len(), counts[0]);
//! # Ok::<(), eelsdata::io::ParserError>(())
//! ```
pub mod analysis;
pub mod io;
pub mod meta;
pub mod params;
pub mod prelude;
pub mod spectrum;

pub use crate::io::ana::{AnaMapReader, AnaReader};
pub use crate::io::csv::CsvReader;
pub use crate::io::elv::ElvReader;
pub use crate::io::raw_spectra::RawSpectraReader;
pub use crate::io::text_params::{ElvTextReader, MapTextReader};

pub use crate::meta::AcquisitionHeader;
pub use crate::params::{ParamMap, Unit, Value};
pub use crate::spectrum::{MapSpectrumRecord, Project, RawSpectrum, RawSpectrumRecord};
