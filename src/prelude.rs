pub use crate::io::EELSFileReader;
pub use crate::params::FromValue;
pub use std::io::prelude::*;
