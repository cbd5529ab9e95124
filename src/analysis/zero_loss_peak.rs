//! Position, width and moments of the zero-loss peak.
//!
//! The region of interest spans 4 eV on either side of the most intense
//! channel, converted to channels with the width of the first channel.

use log::debug;

/// Half width of the region of interest around the peak, in eV
pub const ROI_HALF_WIDTH_EV: f64 = 4.0;
/// Half width of the background window around the start of the region of
/// interest, in eV
pub const BACKGROUND_HALF_WIDTH_EV: f64 = 2.0;

/// The count weighted moments of the energies in the region of interest.
/// Each channel contributes as many observations as its truncated count.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZeroLossPeakStatistics {
    pub number_counts: u64,
    pub minimum_ev: f64,
    pub maximum_ev: f64,
    pub mean_ev: f64,
    /// The sample variance
    pub variance_ev2: f64,
    pub std_ev: f64,
    /// The biased skewness
    pub skewness: f64,
    /// The biased Fisher kurtosis, zero for a normal distribution
    pub kurtosis: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZeroLossPeak {
    pub energies: Vec<f64>,
    pub intensities: Vec<f64>,

    pub max_intensity_index: usize,
    pub position_ev: f64,
    /// Channel range `[start, end)` of the region of interest
    pub roi_indices: (usize, usize),

    pub background: f64,
    pub maximum: f64,
    pub fwhm_ev: f64,
    /// Full width at a tenth of the maximum
    pub fwtm_ev: f64,
    /// Full width at a twentieth of the maximum
    pub fwfm_ev: f64,
}

impl ZeroLossPeak {
    pub fn new(energies: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            energies,
            intensities,
            ..Default::default()
        }
    }

    fn channel_width(&self) -> Option<f64> {
        match self.energies.as_slice() {
            [first, second, ..] if second > first => Some(second - first),
            _ => None,
        }
    }

    /// Channel offset `index + delta_ev / width`, truncated toward zero and
    /// clamped to the spectrum.
    fn offset_channel(&self, index: usize, delta_ev: f64, width: f64) -> usize {
        let channel = (index as f64 + delta_ev / width).trunc();
        let channels = self.intensities.len().min(self.energies.len());
        channel.clamp(0.0, channels as f64) as usize
    }

    /// Locate the most intense channel and the region of interest around it.
    ///
    /// Returns `None` when there are fewer than two channels, the energy axis is
    /// not increasing, or every intensity is NaN.
    pub fn find_position(&mut self) -> Option<usize> {
        let width = self.channel_width()?;
        let (index, _) = self
            .intensities
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, b)) if b >= *v => best,
                _ => Some((i, *v)),
            })?;
        self.max_intensity_index = index;
        self.position_ev = *self.energies.get(index)?;
        self.roi_indices = (
            self.offset_channel(index, -ROI_HALF_WIDTH_EV, width),
            self.offset_channel(index, ROI_HALF_WIDTH_EV, width),
        );
        debug!(
            "Zero-loss peak at {} eV, region of interest {:?}",
            self.position_ev, self.roi_indices
        );
        Some(index)
    }

    /// The energy span of the channels whose background subtracted intensity
    /// reaches `level`
    fn width_at(&self, level: f64) -> f64 {
        let mut above = self
            .intensities
            .iter()
            .zip(self.energies.iter())
            .filter(|(v, _)| *v - self.background >= level)
            .map(|(_, e)| *e);
        match above.next() {
            Some(first) => above.last().unwrap_or(first) - first,
            None => 0.0,
        }
    }

    /// Compute the background and the full widths at a half, a tenth and a
    /// twentieth of the background subtracted maximum. Returns the FWHM.
    pub fn compute_fwhm(&mut self) -> Option<f64> {
        let index = self.find_position()?;
        let width = self.channel_width()?;
        let maximum = self.intensities[index];

        let start = self.roi_indices.0;
        let background_min = self.offset_channel(start, -BACKGROUND_HALF_WIDTH_EV, width);
        let background_max = self.offset_channel(start, BACKGROUND_HALF_WIDTH_EV, width);
        let window = &self.intensities[background_min..background_max];
        self.background = if window.is_empty() {
            0.0
        } else {
            window.iter().sum::<f64>() / window.len() as f64
        };

        let height = maximum - self.background;
        self.fwhm_ev = self.width_at(height / 2.0);
        self.fwtm_ev = self.width_at(height / 10.0);
        self.fwfm_ev = self.width_at(height / 20.0);
        self.maximum = maximum;
        Some(self.fwhm_ev)
    }

    /// Describe the distribution of energies in the region of interest.
    ///
    /// Returns `None` when the peak cannot be located or the region holds fewer
    /// than two observations.
    pub fn compute_statistics(&mut self) -> Option<ZeroLossPeakStatistics> {
        self.find_position()?;
        let (start, end) = self.roi_indices;
        let observations: Vec<(f64, f64)> = self.energies[start..end]
            .iter()
            .zip(self.intensities[start..end].iter())
            .filter(|(_, c)| c.is_finite() && **c >= 1.0)
            .map(|(e, c)| (*e, c.trunc()))
            .collect();

        let n: f64 = observations.iter().map(|(_, w)| w).sum();
        if n < 2.0 {
            return None;
        }
        let mean = observations.iter().map(|(e, w)| e * w).sum::<f64>() / n;
        let central_moment = |k: i32| -> f64 {
            observations
                .iter()
                .map(|(e, w)| w * (e - mean).powi(k))
                .sum::<f64>()
                / n
        };
        let m2 = central_moment(2);
        let m3 = central_moment(3);
        let m4 = central_moment(4);
        let variance = m2 * n / (n - 1.0);

        let minimum = observations.first().map(|(e, _)| *e)?;
        let maximum = observations.last().map(|(e, _)| *e)?;
        Some(ZeroLossPeakStatistics {
            number_counts: n as u64,
            minimum_ev: minimum,
            maximum_ev: maximum,
            mean_ev: mean,
            variance_ev2: variance,
            std_ev: variance.sqrt(),
            skewness: m3 / m2.powf(1.5),
            kurtosis: m4 / (m2 * m2) - 3.0,
        })
    }
}
