use std::io::BufRead;

use log::{debug, warn};

use crate::io::error::ParserError;
use crate::io::header::apply_header_line;
use crate::io::options::ReaderOptions;
use crate::io::table::{LineEvent, ParserState, Phase};
use crate::io::tokenize::{numeric_row, tokenize_line, NumericRow};
use crate::io::traits::EELSFileReader;
use crate::io::utils::read_lines;
use crate::meta::AcquisitionHeader;
use crate::spectrum::MapSpectrumRecord;

use super::{is_header_sentinel, ANA_HEADER_RULES, ANA_ITEM_RULES};

/// Lines starting with this literal open a new acquisition section
pub const SECTION_MARKER: &str = "raw data";

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnaMapFile {
    pub header: AcquisitionHeader,
    pub map: MapSpectrumRecord,
}

#[derive(Debug, Default, Clone)]
pub struct AnaMapReader {
    pub options: ReaderOptions,
}

impl AnaMapReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }

    fn handle_row(map: &mut MapSpectrumRecord, section: Option<usize>, row: &NumericRow) {
        let Some(energy) = row.energy() else {
            debug!("Skipping single value row in map table");
            return;
        };
        match section {
            None => map.push_total_row(energy, row.counts()),
            Some(section) => map.push_section_row(section, energy, row.counts()),
        }
    }

    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<AnaMapFile, ParserError> {
        let mut header = AcquisitionHeader::default();
        let mut map = MapSpectrumRecord::default();
        let mut state = ParserState::new();

        for line in lines {
            let line = line.as_ref();
            let token = tokenize_line(line);
            if token.is_empty() {
                continue;
            }
            let row = numeric_row(&token);
            if row.is_some() {
                state = state.advance(LineEvent::Numeric);
            }
            match (state.phase, row) {
                (Phase::Header, _) => {
                    apply_header_line(ANA_HEADER_RULES, ANA_ITEM_RULES, &mut header, &token)?;
                    if is_header_sentinel(&token) {
                        state = state.advance(LineEvent::Sentinel);
                    }
                }
                (Phase::Table, Some(row)) => Self::handle_row(&mut map, state.section, &row),
                (Phase::Table, None) => {
                    if line.starts_with(SECTION_MARKER) {
                        state = state.advance(LineEvent::SectionMarker);
                        debug!("Opening section {:?}", state.section);
                    } else {
                        debug!("Skipping line in map table: {line:?}");
                    }
                }
            }
        }

        map.last_section = state.section;
        map.header_parameters = header.parameters();
        if map.energies.is_empty() {
            warn!("No aggregate spectrum rows were found before the first section");
        }
        if self.options.strict {
            map.validate()?;
        }
        Ok(AnaMapFile { header, map })
    }
}

impl EELSFileReader for AnaMapReader {
    type Output = AnaMapFile;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_lines(handle)?;
        self.parse_lines(&lines)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    #[test_log::test]
    fn test_read_fixture() -> io::Result<()> {
        let options = ReaderOptions::default().strict(true);
        let ana = AnaMapReader::with_options(options).read_path("./test/data/spectra_1.ana")?;
        let header = &ana.header;
        assert_eq!(header.date.as_deref(), Some("01/Mar/2017"));
        assert_eq!(header.time.as_deref(), Some("11:20"));
        assert_eq!(header.comment.as_deref(), Some(""));
        assert_eq!(header.dose_us, Some(500.0));
        assert_eq!(header.energy_loss_ev, Some(0.0));
        assert_eq!(header.raw, Some(98.7));
        assert_eq!(header.energy_width_ev, Some(7.0));
        assert_eq!(header.dual_det_position, Some(586.0));
        assert_eq!(header.dual_det_post, Some(133.0));
        assert_eq!(header.dual_det_center, Some(608.0));
        assert_eq!(header.q1, Some(13575));
        assert_eq!(header.q1s, Some(3850));
        assert_eq!(header.q3s, Some(0));
        assert_eq!(header.h1, Some(2900));
        assert_eq!(header.h2, Some(-600));
        assert_eq!(header.h3s, Some(0));
        assert_eq!(header.spectrum_alignment_x, Some(259));
        assert_eq!(header.det_map_alignment_x, Some(-1500));
        assert_eq!(header.det_map_alignment_y, Some(1500));
        assert_eq!(header.magnification, Some(37443));

        let map = &ana.map;
        assert_eq!(map.energies.len(), 1024);
        assert_eq!(map.energies[0], -32.00);
        assert_eq!(map.energies[1023], 21.842);
        assert_eq!(map.point_count(), 1);
        let total = map.total_spectrum(0).unwrap();
        assert_eq!(total.len(), 1024);
        assert_eq!(total[0], 4.0);
        assert_eq!(total[1023], 0.0);

        assert_eq!(map.section_count(), 20);
        assert_eq!(map.last_section(), Some(19));
        let sections = map.point_spectra(0).unwrap();
        assert_eq!(sections.len(), 20);
        for spectrum in sections.values() {
            assert_eq!(spectrum.energies, map.energies);
        }
        Ok(())
    }

    #[test]
    fn test_several_points() -> Result<(), ParserError> {
        let lines = [
            "date=03/Mar/2017",
            "Dose=0.5ms",
            "LE=0.0eV, Raw=75.2",
            "Mag=37443",
            "-1.0,1,2,3",
            "0.0,4,5,6",
            "raw data 1",
            "-1.0,0,1,1",
            "0.0,2,2,3",
            "raw data 2",
            "-1.0,1,1,2",
            "0.0,2,3,3",
            "raw data 3",
        ];
        let ana = AnaMapReader::new().parse_lines(&lines)?;
        let map = &ana.map;
        assert_eq!(ana.header.raw, Some(75.2));
        assert_eq!(map.point_count(), 3);
        assert_eq!(map.total_spectrum(2), Some(&[3.0, 6.0][..]));
        // The trailing marker opens a section that never receives rows
        assert_eq!(map.last_section(), Some(2));
        assert_eq!(map.point_spectra(1).unwrap().len(), 2);
        assert_eq!(map.point_spectra(1).unwrap()[&1].counts, vec![1.0, 3.0]);
        map.validate()?;
        Ok(())
    }

    #[test]
    fn test_no_sections() -> Result<(), ParserError> {
        let ana = AnaMapReader::new().parse_lines(&["Mag=10", "-1.0,1,2"])?;
        assert_eq!(ana.map.last_section(), None);
        assert_eq!(ana.map.section_count(), 0);
        assert_eq!(ana.map.point_count(), 2);
        Ok(())
    }
}
