//! Reader for the `.csv` spectrum export.
//!
//! The export is machine written: sixteen metadata rows at fixed positions,
//! then one `energy,count` row per channel. Every field is read strictly, so a
//! malformed file fails instead of producing partial values.

use std::io::BufRead;
use std::str::FromStr;

use log::debug;

use crate::meta::AcquisitionHeader;
use crate::params::ParamMap;
use crate::spectrum::RawSpectrumRecord;

use super::error::ParserError;
use super::header::{convert_value, FieldKind, UnitScale, CHANNEL, ELECTRONVOLT};
use super::traits::EELSFileReader;
use super::utils::decode_line;

/// The count the exporter writes into the last channel
pub const SENTINEL_COUNT: f64 = -2147483648.0;

const METADATA_ROWS: usize = 16;

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsvFile {
    pub date: String,
    pub time: String,
    pub comment: String,
    pub view_fast: String,
    pub view_slow: String,
    pub store_manual: String,
    pub store_auto: String,
    pub energy_loss_ev: f64,
    pub dual_det_center: f64,
    pub raw: f64,
    pub energy_width_ev: f64,
    pub dual_det_post: f64,
    pub dual_window1_position: f64,
    pub dual_window2_position: f64,
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
    pub spectrum_alignment_x: i64,
    pub spectrum_alignment_y: i64,
    pub magnification: i64,
    pub energies: Vec<f64>,
    pub counts: Vec<f64>,
}

impl CsvFile {
    /// The energy and count arrays without the exporter's trailing sentinel
    /// channel, if it is present.
    pub fn without_sentinel_channel(&self) -> (&[f64], &[f64]) {
        match self.counts.last() {
            Some(last) if *last == SENTINEL_COUNT => {
                let n = self.counts.len() - 1;
                (&self.energies[..n.min(self.energies.len())], &self.counts[..n])
            }
            _ => (&self.energies, &self.counts),
        }
    }

    pub fn header(&self) -> AcquisitionHeader {
        AcquisitionHeader {
            date: Some(self.date.clone()),
            time: Some(self.time.clone()),
            comment: Some(self.comment.clone()),
            energy_loss_ev: Some(self.energy_loss_ev),
            raw: Some(self.raw),
            energy_width_ev: Some(self.energy_width_ev),
            dual_det_position: Some(self.dual_window1_position),
            dual_det_post: Some(self.dual_det_post),
            dual_det_center: Some(self.dual_det_center),
            q1: Some(self.q1),
            q2: Some(self.q2),
            q3: Some(self.q3),
            spectrum_alignment_x: Some(self.spectrum_alignment_x),
            spectrum_alignment_y: Some(self.spectrum_alignment_y),
            magnification: Some(self.magnification),
            ..Default::default()
        }
    }

    pub fn parameters(&self) -> ParamMap {
        self.header().parameters()
    }

    /// The exported spectrum, without the sentinel channel. The export carries
    /// no calibration blocks.
    pub fn to_spectrum(&self) -> RawSpectrumRecord {
        let (energies, counts) = self.without_sentinel_channel();
        RawSpectrumRecord {
            energies: energies.to_vec(),
            raw_counts: counts.to_vec(),
            header_parameters: self.parameters(),
            ..Default::default()
        }
    }
}

struct Rows {
    rows: Vec<Vec<String>>,
}

impl Rows {
    fn field(&self, row: usize, field: usize) -> Result<&str, ParserError> {
        let record = self
            .rows
            .get(row)
            .ok_or_else(|| ParserError::MissingSection(format!("metadata row {row}")))?;
        record
            .get(field)
            .map(|s| s.as_str())
            .ok_or_else(|| ParserError::MalformedField {
                row,
                field,
                value: record.join(","),
            })
    }

    fn parse<T: FromStr>(&self, row: usize, field: usize) -> Result<T, ParserError> {
        let text = self.field(row, field)?;
        text.trim()
            .parse::<T>()
            .map_err(|_| ParserError::MalformedField {
                row,
                field,
                value: text.to_string(),
            })
    }

    fn quantity(
        &self,
        row: usize,
        field: usize,
        keyword: &str,
        units: &'static [UnitScale],
    ) -> Result<f64, ParserError> {
        let text = self.field(row, field)?.trim();
        convert_value(keyword, text, &FieldKind::Quantity(units))?
            .and_then(|v| v.to_f64())
            .ok_or_else(|| ParserError::MalformedField {
                row,
                field,
                value: text.to_string(),
            })
    }

    /// The text after the last `=` of a `label=value` field
    fn after_equals(&self, row: usize, field: usize) -> Result<String, ParserError> {
        let text = self.field(row, field)?;
        Ok(text.rsplit('=').next().unwrap_or_default().to_string())
    }

    /// The text after a leading label, with any `=` separator removed
    fn after_label(&self, row: usize, field: usize, label: &str) -> Result<String, ParserError> {
        let text = self.field(row, field)?.trim();
        let rest = text
            .strip_prefix(label)
            .ok_or_else(|| ParserError::MalformedField {
                row,
                field,
                value: text.to_string(),
            })?;
        Ok(rest.trim_start_matches('=').trim().to_string())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CsvReader {}

impl CsvReader {
    pub fn new() -> Self {
        Self {}
    }

    fn read_rows<R: BufRead>(handle: R) -> Result<Vec<Vec<String>>, ParserError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(handle);
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            let row: Vec<String> = record
                .iter()
                .map(|field| decode_line(field).into_owned())
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    fn parse_rows(rows: Vec<Vec<String>>) -> Result<CsvFile, ParserError> {
        let rows = Rows { rows };
        let mut csv_file = CsvFile {
            date: rows.field(0, 0)?.to_string(),
            time: rows.field(1, 0)?.to_string(),
            comment: rows.after_equals(2, 0)?,
            view_fast: rows.after_equals(3, 0)?,
            view_slow: rows.after_label(3, 1, "view slow")?,
            store_manual: rows.after_equals(4, 0)?,
            store_auto: rows.after_label(4, 1, "store-auto")?,
            energy_loss_ev: rows.quantity(5, 1, "LE", ELECTRONVOLT)?,
            dual_det_center: rows.quantity(6, 1, "Dual det. center", CHANNEL)?,
            raw: rows.parse(7, 1)?,
            energy_width_ev: rows.quantity(8, 1, "Energy Width", ELECTRONVOLT)?,
            dual_det_post: rows.quantity(8, 2, "post", CHANNEL)?,
            dual_window1_position: rows.quantity(9, 1, "Dual det. window 1", CHANNEL)?,
            dual_window2_position: rows.quantity(9, 2, "Dual det. window 2", CHANNEL)?,
            q1: rows.parse(10, 1)?,
            q2: rows.parse(11, 1)?,
            q3: rows.parse(12, 1)?,
            spectrum_alignment_x: rows.parse(13, 1)?,
            spectrum_alignment_y: rows.parse(14, 1)?,
            magnification: rows.parse(15, 1)?,
            ..Default::default()
        };

        for (row, record) in rows.rows.iter().enumerate().skip(METADATA_ROWS) {
            if record.iter().all(|f| f.trim().is_empty()) {
                debug!("Skipping empty row {row}");
                continue;
            }
            let energy: f64 = rows.parse(row, 0)?;
            let count: i64 = rows.parse(row, 1)?;
            csv_file.energies.push(energy);
            csv_file.counts.push(count as f64);
        }
        Ok(csv_file)
    }
}

impl EELSFileReader for CsvReader {
    type Output = CsvFile;

    fn read<R: BufRead>(&self, handle: R) -> Result<Self::Output, ParserError> {
        let rows = Self::read_rows(handle)?;
        Self::parse_rows(rows)
    }
}
