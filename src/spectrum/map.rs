use indexmap::IndexMap;

use crate::io::ParserError;
use crate::params::ParamMap;

/// The spectrum recorded at one map point during one acquisition section
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSpectrum {
    pub energies: Vec<f64>,
    pub counts: Vec<f64>,
}

impl PointSpectrum {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

/// A spectral imaging map: one aggregate spectrum per point, as summed by the
/// instrument software, and the spectra of each section that went into it.
///
/// Points are indexed from zero in column order. Sections are keyed by the
/// zero based index of the section marker that opened them.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSpectrumRecord {
    pub energies: Vec<f64>,
    pub total_spectra: Vec<Vec<f64>>,
    pub spectra: Vec<IndexMap<usize, PointSpectrum>>,
    pub last_section: Option<usize>,
    pub header_parameters: ParamMap,
}

impl MapSpectrumRecord {
    /// Append one channel of the aggregate spectra, one count per point
    pub fn push_total_row(&mut self, energy: f64, counts: &[f64]) {
        self.energies.push(energy);
        if self.total_spectra.len() < counts.len() {
            self.total_spectra.resize_with(counts.len(), Vec::new);
        }
        for (point, count) in counts.iter().enumerate() {
            self.total_spectra[point].push(*count);
        }
    }

    /// Append one channel of section `section`, one count per point
    pub fn push_section_row(&mut self, section: usize, energy: f64, counts: &[f64]) {
        if self.spectra.len() < counts.len() {
            self.spectra.resize_with(counts.len(), IndexMap::new);
        }
        for (point, count) in counts.iter().enumerate() {
            let spectrum = self.spectra[point].entry(section).or_default();
            spectrum.energies.push(energy);
            spectrum.counts.push(*count);
        }
    }

    pub fn point_count(&self) -> usize {
        self.total_spectra.len().max(self.spectra.len())
    }

    pub fn total_spectrum(&self, point: usize) -> Option<&[f64]> {
        self.total_spectra.get(point).map(|s| s.as_slice())
    }

    pub fn point_spectra(&self, point: usize) -> Option<&IndexMap<usize, PointSpectrum>> {
        self.spectra.get(point)
    }

    pub fn last_section(&self) -> Option<usize> {
        self.last_section
    }

    /// The number of section markers seen
    pub fn section_count(&self) -> usize {
        self.last_section.map_or(0, |s| s + 1)
    }

    /// Check that every aggregate spectrum covers the energy axis, and that
    /// every section spectrum was recorded on that same axis.
    pub fn validate(&self) -> Result<(), ParserError> {
        let n = self.energies.len();
        for (point, total) in self.total_spectra.iter().enumerate() {
            if total.len() != n {
                return Err(ParserError::LengthMismatch(format!(
                    "{n} energies but {} counts in the total spectrum of point {point}",
                    total.len()
                )));
            }
        }
        for (point, sections) in self.spectra.iter().enumerate() {
            for (section, spectrum) in sections {
                if spectrum.energies != self.energies {
                    return Err(ParserError::LengthMismatch(format!(
                        "Section {section} of point {point} does not share the map energy axis"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut map = MapSpectrumRecord::default();
        map.push_total_row(0.0, &[1.0, 2.0]);
        map.push_total_row(1.0, &[3.0, 4.0]);
        map.last_section = Some(0);
        map.push_section_row(0, 0.0, &[0.5, 1.0]);
        map.push_section_row(0, 1.0, &[1.5, 2.0]);
        map.last_section = Some(1);
        map.push_section_row(1, 0.0, &[0.5, 1.0]);
        map.push_section_row(1, 1.0, &[1.5, 2.0]);

        assert_eq!(map.point_count(), 2);
        assert_eq!(map.total_spectrum(1), Some(&[2.0, 4.0][..]));
        assert_eq!(map.section_count(), 2);
        let sections = map.point_spectra(1).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[&1].counts, vec![1.0, 2.0]);
        assert!(map.validate().is_ok());

        map.push_section_row(1, 2.0, &[0.0, 0.0]);
        assert!(map.validate().is_err());
    }
}
