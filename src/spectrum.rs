//! Spectrum records and the detector correction applied to them.

pub mod container;
pub mod correction;
pub mod map;
pub mod raw;

pub use crate::spectrum::container::{Project, RawSpectrum};
pub use crate::spectrum::correction::corrected_counts;
pub use crate::spectrum::map::{MapSpectrumRecord, PointSpectrum};
pub use crate::spectrum::raw::RawSpectrumRecord;
