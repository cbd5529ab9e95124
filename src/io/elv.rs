//! Reader for `.elv` single spectrum files.
//!
//! An `.elv` file starts with `keyword=value` header lines, some of which hold
//! several comma separated pairs. The table that follows has one
//! `energy,count` row per channel, then the gain correction block and the dark
//! current block, one value per line.

use std::io::BufRead;

use log::debug;

use crate::keyword_rule;
use crate::meta::AcquisitionHeader;
use crate::params::ParamMap;
use crate::spectrum::RawSpectrumRecord;

use super::error::ParserError;
use super::header::{
    apply_header_line, FieldKind, KeyMatch, KeywordRule, CHANNEL, ELECTRONVOLT, MICROSECOND,
};
use super::options::ReaderOptions;
use super::table::{CalibratedTable, LineEvent, ParserState, Phase};
use super::tokenize::{numeric_row, tokenize_line};
use super::traits::EELSFileReader;
use super::utils::read_lines;

type H = AcquisitionHeader;

/// Keywords of the one pair per line header
pub static ELV_HEADER_RULES: &[KeywordRule<AcquisitionHeader>] = &[
    keyword_rule!(H, KeyMatch::Prefix("date"), FieldKind::Text, date),
    keyword_rule!(H, KeyMatch::Prefix("Time"), FieldKind::Text, time),
    keyword_rule!(H, KeyMatch::Prefix("comment"), FieldKind::Text, comment),
    keyword_rule!(H, KeyMatch::Prefix("dose"), FieldKind::Quantity(MICROSECOND), dose_us),
    keyword_rule!(
        H,
        KeyMatch::Prefix("Energy Window Width"),
        FieldKind::Quantity(ELECTRONVOLT),
        energy_width_ev
    ),
    keyword_rule!(H, KeyMatch::Prefix("center"), FieldKind::Quantity(CHANNEL), dual_det_center),
    keyword_rule!(H, KeyMatch::Exact("Q1"), FieldKind::Integer, q1),
    keyword_rule!(H, KeyMatch::Exact("Q1S"), FieldKind::Integer, q1s),
    keyword_rule!(H, KeyMatch::Exact("Q2"), FieldKind::Integer, q2),
    keyword_rule!(H, KeyMatch::Exact("Q2S"), FieldKind::Integer, q2s),
    keyword_rule!(H, KeyMatch::Exact("Q3"), FieldKind::Integer, q3),
    keyword_rule!(H, KeyMatch::Exact("H1"), FieldKind::Integer, h1),
    keyword_rule!(H, KeyMatch::Exact("H1S"), FieldKind::Integer, h1s),
    keyword_rule!(H, KeyMatch::Exact("H2"), FieldKind::Integer, h2),
    keyword_rule!(H, KeyMatch::Exact("H2S"), FieldKind::Integer, h2s),
    keyword_rule!(H, KeyMatch::Exact("H4"), FieldKind::Integer, h4),
    keyword_rule!(H, KeyMatch::Prefix("ELV-x"), FieldKind::Integer, elv_x),
    keyword_rule!(H, KeyMatch::Prefix("ELV-y"), FieldKind::Integer, elv_y),
    keyword_rule!(H, KeyMatch::Prefix("Spectrum align-x"), FieldKind::Integer, spectrum_alignment_x),
    keyword_rule!(H, KeyMatch::Prefix("Spectrum align-y"), FieldKind::Integer, spectrum_alignment_y),
    keyword_rule!(
        H,
        KeyMatch::Prefix("DET alignment-x(spec.)"),
        FieldKind::Integer,
        det_spec_alignment_x
    ),
    keyword_rule!(
        H,
        KeyMatch::Prefix("DET alignment-y(spec.)"),
        FieldKind::Integer,
        det_spec_alignment_y
    ),
    keyword_rule!(
        H,
        KeyMatch::Prefix("DET alignment-x(map)"),
        FieldKind::Integer,
        det_map_alignment_x
    ),
    keyword_rule!(
        H,
        KeyMatch::Prefix("DET alignment-y(map)"),
        FieldKind::Integer,
        det_map_alignment_y
    ),
    keyword_rule!(H, KeyMatch::Prefix("Mag"), FieldKind::Integer, magnification),
];

/// Keywords found in the comma separated header lines
pub static ELV_ITEM_RULES: &[KeywordRule<AcquisitionHeader>] = &[
    keyword_rule!(H, KeyMatch::Prefix("LE"), FieldKind::Quantity(ELECTRONVOLT), energy_loss_ev),
    keyword_rule!(H, KeyMatch::Prefix("Raw"), FieldKind::Float, raw),
    keyword_rule!(
        H,
        KeyMatch::Prefix("Dual det. position"),
        FieldKind::Quantity(CHANNEL),
        dual_det_position
    ),
    keyword_rule!(H, KeyMatch::Prefix("post"), FieldKind::Quantity(CHANNEL), dual_det_post),
];

/// The contents of an `.elv` file
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElvFile {
    pub header: AcquisitionHeader,
    pub spectrum: RawSpectrumRecord,
}

impl ElvFile {
    pub fn parameters(&self) -> ParamMap {
        self.header.parameters()
    }

    pub fn corrected_counts(&self) -> Vec<f64> {
        self.spectrum.corrected_counts()
    }

    pub fn into_spectrum(self) -> RawSpectrumRecord {
        self.spectrum
    }
}

#[derive(Debug, Default, Clone)]
pub struct ElvReader {
    pub options: ReaderOptions,
}

impl ElvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Parse the lines of an `.elv` file that has already been read.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<ElvFile, ParserError> {
        let mut header = AcquisitionHeader::default();
        let mut table = CalibratedTable::new(self.options.channel_count);
        let mut state = ParserState::new();

        for (line_number, line) in lines.iter().enumerate() {
            let token = tokenize_line(line.as_ref());
            if token.is_empty() {
                continue;
            }
            let row = numeric_row(&token);
            let event = if row.is_some() {
                LineEvent::Numeric
            } else {
                LineEvent::Text
            };
            state = state.advance(event);

            match (state.phase, row) {
                (Phase::Header, _) => {
                    apply_header_line(ELV_HEADER_RULES, ELV_ITEM_RULES, &mut header, &token)?;
                }
                (Phase::Table, Some(row)) => {
                    if !table.push_row(&row) {
                        debug!("Skipping {} column row at line {line_number}", row.counts().len() + 1);
                    }
                }
                (Phase::Table, None) => {
                    debug!("Skipping line {line_number} in table: {:?}", line.as_ref());
                }
            }
        }

        let spectrum = table.finish(header.parameters());
        if self.options.strict {
            spectrum.validate()?;
        }
        Ok(ElvFile { header, spectrum })
    }
}

impl EELSFileReader for ElvReader {
    type Output = ElvFile;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_lines(handle)?;
        self.parse_lines(&lines)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::header::find_shadowed_rule;
    use crate::params::Value;
    use std::io;

    #[test]
    fn test_tables_are_unshadowed() {
        assert_eq!(find_shadowed_rule(ELV_HEADER_RULES), None);
        assert_eq!(find_shadowed_rule(ELV_ITEM_RULES), None);
    }

    #[test_log::test]
    fn test_read_fixture() -> io::Result<()> {
        let elv = ElvReader::new().read_path("./test/data/30kV_7eV.elv")?;
        let header = &elv.header;
        assert_eq!(header.date.as_deref(), Some("01/Mar/2017"));
        assert_eq!(header.time.as_deref(), Some("10:59"));
        assert_eq!(header.comment.as_deref(), Some(""));
        assert_eq!(header.dose_us, Some(500.0));
        assert_eq!(header.energy_loss_ev, Some(0.0));
        assert_eq!(header.raw, Some(100.0));
        assert_eq!(header.energy_width_ev, Some(7.0));
        assert_eq!(header.dual_det_position, Some(586.0));
        assert_eq!(header.dual_det_post, Some(133.0));
        assert_eq!(header.dual_det_center, Some(608.0));
        assert_eq!(header.q1, Some(13563));
        assert_eq!(header.q1s, Some(3850));
        assert_eq!(header.q3, Some(2700));
        assert_eq!(header.h2, Some(-600));
        assert_eq!(header.spectrum_alignment_x, Some(273));
        assert_eq!(header.det_map_alignment_x, Some(-1500));
        assert_eq!(header.magnification, Some(37443));

        let spectrum = &elv.spectrum;
        assert_eq!(spectrum.energies.len(), 1024);
        assert_eq!(spectrum.raw_counts.len(), 1024);
        assert_eq!(spectrum.gain_corrections.len(), 1024);
        assert_eq!(spectrum.dark_currents.len(), 1024);
        assert_eq!(spectrum.energies[0], -32.00);
        assert_eq!(spectrum.energies[1023], 21.84);
        assert_eq!(spectrum.raw_counts[0], 2282.0);
        assert_eq!(spectrum.raw_counts[1023], 0.0);
        assert_eq!(spectrum.gain_corrections[0], 0.918375);
        assert_eq!(spectrum.dark_currents[0], 2313.0);
        assert!(spectrum.energy_axis_is_increasing());
        spectrum.validate()?;

        let counts = elv.corrected_counts();
        assert_eq!(counts.len(), 1024);
        assert_eq!(counts[0], (2282.0 - 2313.0) / 0.918375);
        // The last channel has no gain and stays undefined
        assert!(counts[1023].is_nan());

        assert_eq!(
            spectrum.header_parameters.get("magnification"),
            Some(&Value::Int(37443))
        );
        Ok(())
    }

    #[test]
    fn test_unit_mismatch() {
        let lines = ["date=01/Mar/2017", "Energy Window Width=7.0ms", "-32.00,2282"];
        let err = ElvReader::new().parse_lines(&lines).unwrap_err();
        assert!(matches!(err, ParserError::UnitMismatch { .. }));

        let lines = ["LE=0.0ms, Raw=100.0"];
        let err = ElvReader::new().parse_lines(&lines).unwrap_err();
        assert!(matches!(err, ParserError::UnitMismatch { .. }));
    }

    #[test]
    fn test_dose_in_milliseconds() -> Result<(), ParserError> {
        let elv = ElvReader::new().parse_lines(&["dose=0.5ms"])?;
        assert_eq!(elv.header.dose_us, Some(500.0));
        Ok(())
    }

    #[test]
    fn test_tolerant_skip() -> Result<(), ParserError> {
        let lines = [
            "date=01/Mar/2017",
            "Q1=many",
            "ELV-x=0, stray",
            "-1.0,10",
            "garbage line",
            "0.0,abc",
            "0.0,20",
            "1.0,30,40",
            "1.0",
            "2.0",
            "5.0",
            "6.0",
        ];
        let options = ReaderOptions::default().channel_count(2);
        let elv = ElvReader::with_options(options).parse_lines(&lines)?;
        assert!(elv.header.q1.is_none());
        assert!(elv.header.elv_x.is_none());
        assert_eq!(elv.spectrum.energies, vec![-1.0, 0.0]);
        assert_eq!(elv.spectrum.raw_counts, vec![10.0, 20.0]);
        assert_eq!(elv.spectrum.gain_corrections, vec![1.0, 2.0]);
        assert_eq!(elv.spectrum.dark_currents, vec![5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_keywords_after_table_ignored() -> Result<(), ParserError> {
        let lines = ["-1.0,10", "Mag=1000", "0.0,20"];
        let elv = ElvReader::new().parse_lines(&lines)?;
        assert!(elv.header.magnification.is_none());
        assert_eq!(elv.spectrum.len(), 2);
        Ok(())
    }

    #[test]
    fn test_strict_mode() {
        let lines = ["-1.0,10", "0.0,20", "1.0", "2.0", "3.0", "4.0", "5.0", "6.0"];
        let options = ReaderOptions::default().channel_count(2).strict(true);
        let err = ElvReader::with_options(options).parse_lines(&lines);
        assert!(matches!(err, Err(ParserError::LengthMismatch(_))));

        // Exactly one trailing value is trimmed rather than rejected
        let lines = ["-1.0,10", "0.0,20", "1.0", "2.0", "3.0", "4.0", "0.0"];
        let elv = ElvReader::with_options(options).parse_lines(&lines);
        assert!(elv.is_ok());
    }
}
