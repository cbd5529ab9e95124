use crate::io::ParserError;
use crate::params::ParamMap;

use super::correction::corrected_counts;

/// A single spectrum as recorded by the detector, before correction.
///
/// `energies` and `raw_counts` are aligned channel for channel. The gain
/// correction and dark current blocks are expected to match them in length,
/// but are only checked by [`RawSpectrumRecord::validate`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSpectrumRecord {
    pub energies: Vec<f64>,
    pub raw_counts: Vec<f64>,
    pub gain_corrections: Vec<f64>,
    pub dark_currents: Vec<f64>,
    pub header_parameters: ParamMap,
}

impl RawSpectrumRecord {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// The net counts for each channel, see [`corrected_counts`]
    pub fn corrected_counts(&self) -> Vec<f64> {
        corrected_counts(&self.raw_counts, &self.dark_currents, &self.gain_corrections)
    }

    pub fn energy_axis_is_increasing(&self) -> bool {
        self.energies.windows(2).all(|w| w[0] < w[1])
    }

    /// The energy step between the first two channels
    pub fn channel_width(&self) -> Option<f64> {
        match self.energies.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }

    /// Check that every channel array is aligned with the energy axis.
    ///
    /// Calibration blocks that are entirely absent are allowed, as some formats
    /// never record them.
    pub fn validate(&self) -> Result<(), ParserError> {
        let n = self.energies.len();
        if self.raw_counts.len() != n {
            return Err(ParserError::LengthMismatch(format!(
                "{n} energies but {} raw counts",
                self.raw_counts.len()
            )));
        }
        for (name, values) in [
            ("gain corrections", &self.gain_corrections),
            ("dark currents", &self.dark_currents),
        ] {
            if !values.is_empty() && values.len() != n {
                return Err(ParserError::LengthMismatch(format!(
                    "{n} energies but {} {name}",
                    values.len()
                )));
            }
        }
        Ok(())
    }
}
