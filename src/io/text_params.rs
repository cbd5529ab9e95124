//! Readers for the UTF-16 text parameter files the instrument writes alongside
//! its spectra.
//!
//! A single spectrum `.elv` has a `.txt` of the same name. A map folder has one
//! whose `[Analysis]` section lists the settings of up to three simultaneous
//! analysis windows as `/` separated triplets, `Dose=0.5/--/--ms`.

use std::io::BufRead;

use log::{debug, warn};

use crate::keyword_rule;
use crate::meta::acquisition::push_param;
use crate::meta::labels::sidecar;
use crate::params::{split_unit_suffix, ParamMap};

use super::error::ParserError;
use super::header::{
    dispatch, unit_scale, FieldKind, KeyMatch, KeywordRule, UnitScale, ELECTRONVOLT, MICROSECOND,
    MILLIMETER, MILLISECOND, VOLT,
};
use super::tokenize::{tokenize_line, KeyValue, LineToken};
use super::traits::EELSFileReader;
use super::utils::read_utf16_lines;

/// The parameters of a single spectrum acquisition
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElvTextParameters {
    pub model: Option<String>,
    pub sample_height_mm: Option<f64>,
    pub file_name: Option<String>,
    pub comment: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub accelerating_voltage_v: Option<f64>,
    pub energy_width_ev: Option<f64>,
    pub energy_loss_ev: Option<f64>,
    pub speed_us: Option<f64>,
}

type E = ElvTextParameters;

pub static ELV_TEXT_RULES: &[KeywordRule<ElvTextParameters>] = &[
    keyword_rule!(E, KeyMatch::Prefix("EELS model"), FieldKind::Text, model),
    keyword_rule!(E, KeyMatch::Prefix("S.H."), FieldKind::Quantity(MILLIMETER), sample_height_mm),
    keyword_rule!(E, KeyMatch::Prefix("File name"), FieldKind::Text, file_name),
    keyword_rule!(E, KeyMatch::Prefix("Comments"), FieldKind::Text, comment),
    keyword_rule!(E, KeyMatch::Prefix("Date"), FieldKind::Text, date),
    keyword_rule!(E, KeyMatch::Prefix("Time"), FieldKind::Text, time),
    keyword_rule!(
        E,
        KeyMatch::Prefix("Accelerating Voltage"),
        FieldKind::SpacedQuantity(VOLT),
        accelerating_voltage_v
    ),
    keyword_rule!(E, KeyMatch::Prefix("Energy Width"), FieldKind::Quantity(ELECTRONVOLT), energy_width_ev),
    keyword_rule!(E, KeyMatch::Prefix("Energy Loss"), FieldKind::Quantity(ELECTRONVOLT), energy_loss_ev),
    keyword_rule!(E, KeyMatch::Prefix("Spectrum speed"), FieldKind::Quantity(MICROSECOND), speed_us),
];

impl ElvTextParameters {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParserError> {
        let mut params = Self::default();
        for line in lines {
            if let LineToken::KeyValue(kv) = tokenize_line(line.as_ref()) {
                if !dispatch(ELV_TEXT_RULES, &mut params, &kv)?.is_applied() {
                    debug!("Skipping text parameter {}={}", kv.keyword, kv.value);
                }
            }
        }
        Ok(params)
    }

    /// The parameters that are present, under their export labels
    pub fn items(&self) -> ParamMap {
        let mut params = ParamMap::new();
        push_param(&mut params, sidecar::MODEL, &self.model);
        push_param(&mut params, sidecar::SAMPLE_HEIGHT_MM, &self.sample_height_mm);
        push_param(&mut params, sidecar::FILEPATH, &self.file_name);
        push_param(&mut params, sidecar::COMMENT, &self.comment);
        push_param(&mut params, sidecar::DATE, &self.date);
        push_param(&mut params, sidecar::TIME, &self.time);
        push_param(&mut params, sidecar::ACCELERATING_VOLTAGE_V, &self.accelerating_voltage_v);
        push_param(&mut params, sidecar::ENERGY_WIDTH_EV, &self.energy_width_ev);
        push_param(&mut params, sidecar::ENERGY_LOSS_EV, &self.energy_loss_ev);
        push_param(&mut params, sidecar::SPEED_US, &self.speed_us);
        params
    }
}

/// The settings of one analysis window of a map acquisition
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    pub dose_ms: Option<f64>,
    pub energy_width_ev: Option<i64>,
    pub energy_loss_ev: Option<f64>,
}

/// The parameters of a spectral imaging map acquisition
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapTextParameters {
    pub magnification: Option<i64>,
    pub model: Option<String>,
    pub sample_height_mm: Option<f64>,
    pub file_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub capture_resolution: Option<String>,
    pub accelerating_voltage_v: Option<f64>,
    pub energy_width_ev: Option<f64>,
    pub energy_loss_ev: Option<f64>,
    pub speed: Option<String>,
    pub dpi: Option<i64>,
    pub pixel_distance: Option<String>,

    pub analyses: [Analysis; 3],
    pub a: Option<String>,
    pub b: Option<String>,
    pub distance: Option<String>,
    pub pitch: Option<String>,
    pub number: Option<i64>,
    pub adjust: Option<String>,
    pub data_size: Option<String>,
    pub integration: Option<i64>,
}

type M = MapTextParameters;

pub static MAP_TEXT_RULES: &[KeywordRule<MapTextParameters>] = &[
    keyword_rule!(M, KeyMatch::Prefix("SU9000 Magnification"), FieldKind::Integer, magnification),
    keyword_rule!(M, KeyMatch::Prefix("EELS model"), FieldKind::Text, model),
    keyword_rule!(M, KeyMatch::Prefix("S.H."), FieldKind::Quantity(MILLIMETER), sample_height_mm),
    keyword_rule!(M, KeyMatch::Prefix("File Name"), FieldKind::Text, file_name),
    keyword_rule!(M, KeyMatch::Prefix("Date"), FieldKind::Text, date),
    keyword_rule!(M, KeyMatch::Prefix("Time"), FieldKind::Text, time),
    keyword_rule!(M, KeyMatch::Prefix("Capture resolution"), FieldKind::Text, capture_resolution),
    keyword_rule!(
        M,
        KeyMatch::Prefix("Accelerating Voltage"),
        FieldKind::SpacedQuantity(VOLT),
        accelerating_voltage_v
    ),
    keyword_rule!(M, KeyMatch::Prefix("Energy Width"), FieldKind::Quantity(ELECTRONVOLT), energy_width_ev),
    keyword_rule!(M, KeyMatch::Prefix("Energy Loss"), FieldKind::Quantity(ELECTRONVOLT), energy_loss_ev),
    keyword_rule!(M, KeyMatch::Prefix("Scan Speed"), FieldKind::Text, speed),
    keyword_rule!(M, KeyMatch::Prefix("DPI"), FieldKind::Integer, dpi),
    keyword_rule!(M, KeyMatch::Prefix("Pixel Distance"), FieldKind::Text, pixel_distance),
];

/// Scalar keywords of the `[Analysis]` section
pub static ANALYSIS_TEXT_RULES: &[KeywordRule<MapTextParameters>] = &[
    keyword_rule!(M, KeyMatch::Prefix("A(x,y)"), FieldKind::Text, a),
    keyword_rule!(M, KeyMatch::Prefix("B(x,y)"), FieldKind::Text, b),
    keyword_rule!(M, KeyMatch::Prefix("Distance"), FieldKind::Text, distance),
    keyword_rule!(M, KeyMatch::Prefix("Pitch"), FieldKind::Text, pitch),
    keyword_rule!(M, KeyMatch::Prefix("Number"), FieldKind::Integer, number),
    keyword_rule!(M, KeyMatch::Prefix("Adjust"), FieldKind::Text, adjust),
    keyword_rule!(M, KeyMatch::Prefix("Data Size"), FieldKind::Text, data_size),
    keyword_rule!(M, KeyMatch::Prefix("Integration"), FieldKind::Integer, integration),
];

/// The line that switches a map parameter file to its analysis section
pub const ANALYSIS_SECTION: &str = "[Analysis]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Map,
    Analysis,
}

/// Split a triplet value into the text of its three slots and the scale of
/// its unit. Placeholder slots, starting with `-`, are `None`.
fn triplet_slots<'a>(
    kv: &KeyValue<'a>,
    units: &'static [UnitScale],
) -> Result<([Option<&'a str>; 3], f64), ParserError> {
    let mut slots = [None; 3];
    let Some((numbers, unit)) = split_unit_suffix(kv.value) else {
        return Ok((slots, 1.0));
    };
    let scale = unit_scale(kv.keyword, units, unit)?;
    let parts: Vec<&str> = numbers.split('/').map(|s| s.trim()).collect();
    if parts.len() != slots.len() {
        warn!(
            "Expected three analysis slots for {}, found {}",
            kv.keyword,
            parts.len()
        );
    }
    for (slot, part) in slots.iter_mut().zip(parts) {
        if !part.starts_with('-') {
            *slot = Some(part);
        }
    }
    Ok((slots, scale))
}

impl MapTextParameters {
    pub fn analysis1(&self) -> &Analysis {
        &self.analyses[0]
    }

    pub fn analysis2(&self) -> &Analysis {
        &self.analyses[1]
    }

    pub fn analysis3(&self) -> &Analysis {
        &self.analyses[2]
    }

    fn apply_triplet(&mut self, kv: &KeyValue<'_>) -> Result<bool, ParserError> {
        if kv.keyword.starts_with("Dose") {
            let (slots, scale) = triplet_slots(kv, MILLISECOND)?;
            for (analysis, slot) in self.analyses.iter_mut().zip(slots) {
                if let Some(v) = slot.and_then(|s| s.parse::<f64>().ok()) {
                    analysis.dose_ms = Some(v * scale);
                }
            }
        } else if kv.keyword.starts_with("Energy Width") {
            let (slots, _) = triplet_slots(kv, ELECTRONVOLT)?;
            for (analysis, slot) in self.analyses.iter_mut().zip(slots) {
                if let Some(v) = slot.and_then(|s| s.parse::<i64>().ok()) {
                    analysis.energy_width_ev = Some(v);
                }
            }
        } else if kv.keyword.starts_with("Energy Loss") {
            let (slots, scale) = triplet_slots(kv, ELECTRONVOLT)?;
            for (analysis, slot) in self.analyses.iter_mut().zip(slots) {
                if let Some(v) = slot.and_then(|s| s.parse::<f64>().ok()) {
                    analysis.energy_loss_ev = Some(v * scale);
                }
            }
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParserError> {
        let mut params = Self::default();
        let mut section = Section::Map;
        for line in lines {
            let line = line.as_ref();
            if line.trim_start().starts_with(ANALYSIS_SECTION) {
                section = Section::Analysis;
                continue;
            }
            let LineToken::KeyValue(kv) = tokenize_line(line) else {
                continue;
            };
            let applied = match section {
                Section::Map => dispatch(MAP_TEXT_RULES, &mut params, &kv)?.is_applied(),
                Section::Analysis => {
                    params.apply_triplet(&kv)?
                        || dispatch(ANALYSIS_TEXT_RULES, &mut params, &kv)?.is_applied()
                }
            };
            if !applied {
                debug!("Skipping text parameter {}={}", kv.keyword, kv.value);
            }
        }
        Ok(params)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ElvTextReader;

impl EELSFileReader for ElvTextReader {
    type Output = ElvTextParameters;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_utf16_lines(handle)?;
        ElvTextParameters::from_lines(&lines)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MapTextReader;

impl EELSFileReader for MapTextReader {
    type Output = MapTextParameters;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_utf16_lines(handle)?;
        MapTextParameters::from_lines(&lines)
    }
}

/// A text parameter file of either kind
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextParameters {
    Elv(ElvTextParameters),
    Map(MapTextParameters),
}

/// Reads a text parameter file as a map file if it has an `[Analysis]`
/// section, and as a single spectrum file otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextParametersReader;

impl EELSFileReader for TextParametersReader {
    type Output = TextParameters;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let lines = read_utf16_lines(handle)?;
        let has_analysis = lines
            .iter()
            .any(|line| line.trim_start().starts_with(ANALYSIS_SECTION));
        if has_analysis {
            Ok(TextParameters::Map(MapTextParameters::from_lines(&lines)?))
        } else {
            Ok(TextParameters::Elv(ElvTextParameters::from_lines(&lines)?))
        }
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
        assert_eq!(find_shadowed_rule(ELV_TEXT_RULES), None);
        assert_eq!(find_shadowed_rule(MAP_TEXT_RULES), None);
        assert_eq!(find_shadowed_rule(ANALYSIS_TEXT_RULES), None);
    }

    #[test_log::test]
    fn test_read_elv_text() -> io::Result<()> {
        let params = ElvTextReader.read_path("./test/data/30kV_7eV.txt")?;
        assert_eq!(params.model.as_deref(), Some("SU-EELS"));
        assert_eq!(params.sample_height_mm, Some(0.0));
        assert_eq!(
            params.file_name.as_deref(),
            Some(r"D:\2017\System_baseline_march2017\30kV_7eV.elv")
        );
        assert_eq!(params.comment.as_deref(), Some(""));
        assert_eq!(params.date.as_deref(), Some("01/Mar/2017"));
        assert_eq!(params.time.as_deref(), Some("10:59"));
        assert_eq!(params.accelerating_voltage_v, Some(30000.0));
        assert_eq!(params.energy_width_ev, Some(7.0));
        assert_eq!(params.energy_loss_ev, Some(0.0));
        assert_eq!(params.speed_us, Some(500.0));

        let items = params.items();
        assert_eq!(items.len(), 10);
        assert_eq!(items["speed (us)"], Value::Float(500.0));
        assert_eq!(items["accelerating voltage (V)"], Value::Float(30000.0));
        Ok(())
    }

    #[test]
    fn test_elv_text_unit_mismatch() {
        let err = ElvTextParameters::from_lines(&["Accelerating Voltage=30 kV"]).unwrap_err();
        assert!(matches!(err, ParserError::UnitMismatch { .. }));
        let err = ElvTextParameters::from_lines(&["S.H.=0.0eV"]).unwrap_err();
        assert!(matches!(err, ParserError::UnitMismatch { .. }));
    }

    #[test_log::test]
    fn test_read_map_text() -> io::Result<()> {
        let params = MapTextReader.read_path("./test/data/30kV_march2017_7eV.txt")?;
        assert_eq!(params.magnification, Some(130000));
        assert_eq!(params.model.as_deref(), Some("SU-EELS"));
        assert_eq!(params.sample_height_mm, Some(0.0));
        assert_eq!(params.file_name.as_deref(), Some("30kV_march2017_7eV"));
        assert_eq!(params.date.as_deref(), Some("01/Mar/2017"));
        assert_eq!(params.time.as_deref(), Some("11:20:40"));
        assert_eq!(params.capture_resolution.as_deref(), Some("512x512"));
        assert_eq!(params.accelerating_voltage_v, Some(30000.0));
        assert_eq!(params.energy_width_ev, Some(7.0));
        assert_eq!(params.energy_loss_ev, Some(0.0));
        assert_eq!(params.speed.as_deref(), Some("Slow1"));
        assert_eq!(params.dpi, Some(128));
        assert_eq!(params.pixel_distance.as_deref(), Some(""));

        assert_eq!(params.analysis1().dose_ms, Some(0.5));
        assert_eq!(params.analysis1().energy_width_ev, Some(7));
        assert_eq!(params.analysis1().energy_loss_ev, Some(0.0));
        assert_eq!(*params.analysis2(), Analysis::default());
        assert_eq!(*params.analysis3(), Analysis::default());

        assert_eq!(params.a.as_deref(), Some(""));
        assert_eq!(params.b.as_deref(), Some(""));
        assert_eq!(params.distance.as_deref(), Some(""));
        assert_eq!(params.pitch.as_deref(), Some(""));
        assert_eq!(params.number, Some(1));
        assert_eq!(params.adjust.as_deref(), Some(""));
        assert_eq!(params.data_size.as_deref(), Some(""));
        assert_eq!(params.integration, Some(20));
        Ok(())
    }

    #[test]
    fn test_triplets() -> Result<(), ParserError> {
        let lines = [
            "Energy Width=15eV",
            "[Analysis]",
            "Dose=0.5/1.0/--ms",
            "Energy Width=7/15/--eV",
            "Energy Loss=--/5.5/10.0eV",
        ];
        let params = MapTextParameters::from_lines(&lines)?;
        assert_eq!(params.energy_width_ev, Some(15.0));
        assert_eq!(params.analyses[0].dose_ms, Some(0.5));
        assert_eq!(params.analyses[1].dose_ms, Some(1.0));
        assert_eq!(params.analyses[2].dose_ms, None);
        assert_eq!(params.analyses[1].energy_width_ev, Some(15));
        assert_eq!(params.analyses[0].energy_loss_ev, None);
        assert_eq!(params.analyses[2].energy_loss_ev, Some(10.0));

        let err = MapTextParameters::from_lines(&["[Analysis]", "Energy Loss=1/2/3ms"]);
        assert!(matches!(err, Err(ParserError::UnitMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_either_kind() -> Result<(), ParserError> {
        let params = TextParametersReader.read_path("./test/data/30kV_7eV.txt")?;
        assert!(matches!(params, TextParameters::Elv(p) if p.speed_us == Some(500.0)));
        let params = TextParametersReader.read_path("./test/data/30kV_march2017_7eV.txt")?;
        assert!(matches!(params, TextParameters::Map(p) if p.integration == Some(20)));
        Ok(())
    }
}
