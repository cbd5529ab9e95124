use std::io::BufRead;

use log::debug;

use crate::io::error::ParserError;
use crate::io::header::apply_header_line;
use crate::io::options::ReaderOptions;
use crate::io::table::{CalibratedTable, LineEvent, ParserState, Phase};
use crate::io::tokenize::{numeric_row, tokenize_line};
use crate::io::traits::EELSFileReader;
use crate::io::utils::read_lines;
use crate::meta::AcquisitionHeader;
use crate::spectrum::RawSpectrumRecord;

use super::{is_header_sentinel, ANA_HEADER_RULES, ANA_ITEM_RULES};

/// The contents of a single point `.ana` file.
///
/// The instrument software has already applied the detector corrections, so
/// the counts stored in `spectrum.raw_counts` are net counts. The calibration
/// blocks are carried along as written.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnaFile {
    pub header: AcquisitionHeader,
    pub spectrum: RawSpectrumRecord,
}

impl AnaFile {
    pub fn energies(&self) -> &[f64] {
        &self.spectrum.energies
    }

    pub fn counts(&self) -> &[f64] {
        &self.spectrum.raw_counts
    }
}

#[derive(Debug, Default, Clone)]
pub struct AnaReader {
    pub options: ReaderOptions,
}

impl AnaReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }

    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<AnaFile, ParserError> {
        let mut header = AcquisitionHeader::default();
        let mut table = CalibratedTable::new(self.options.channel_count);
        let mut state = ParserState::new();

        for line in lines {
            let token = tokenize_line(line.as_ref());
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
                (Phase::Table, Some(row)) => {
                    if !table.push_row(&row) {
                        debug!("Skipping wide row in a single point file");
                    }
                }
                (Phase::Table, None) => {
                    debug!("Skipping line in table: {:?}", line.as_ref());
                }
            }
        }

        let spectrum = table.finish(header.parameters());
        if self.options.strict {
            spectrum.validate()?;
        }
        Ok(AnaFile { header, spectrum })
    }
}

impl EELSFileReader for AnaReader {
    type Output = AnaFile;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_lines(handle)?;
        self.parse_lines(&lines)
    }
}
