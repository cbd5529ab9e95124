//! Typed records of the acquisition settings stored in file headers, and the
//! labels they are exported under.

pub mod acquisition;
pub mod labels;

pub use crate::meta::acquisition::AcquisitionHeader;
