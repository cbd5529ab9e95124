//! Measurements made on corrected spectra.

pub mod zero_loss_peak;

pub use crate::analysis::zero_loss_peak::{ZeroLossPeak, ZeroLossPeakStatistics};
