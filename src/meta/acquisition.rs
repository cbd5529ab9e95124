use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::params::{ParamMap, Value};

use super::labels;

/// The acquisition settings recorded in the header of a spectrum file.
///
/// Every field is optional: a field is `None` when the keyword never appeared
/// in the file or its value could not be read. Unit-carrying fields are stored
/// in the unit named by the field.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcquisitionHeader {
    pub date: Option<String>,
    pub time: Option<String>,
    pub comment: Option<String>,
    /// The acquisition speed, in microseconds
    pub dose_us: Option<f64>,
    /// `LE`, the energy loss the spectrometer was set to
    pub energy_loss_ev: Option<f64>,
    pub raw: Option<f64>,
    pub energy_width_ev: Option<f64>,

    // Dual detector positions, in channels
    pub dual_det_position: Option<f64>,
    pub dual_det_post: Option<f64>,
    pub dual_det_center: Option<f64>,

    // Lens settings
    pub q1: Option<i64>,
    pub q1s: Option<i64>,
    pub q2: Option<i64>,
    pub q2s: Option<i64>,
    pub q3: Option<i64>,
    pub q3s: Option<i64>,
    pub h1: Option<i64>,
    pub h1s: Option<i64>,
    pub h2: Option<i64>,
    pub h2s: Option<i64>,
    pub h3: Option<i64>,
    pub h3s: Option<i64>,
    pub h4: Option<i64>,

    pub elv_x: Option<i64>,
    pub elv_y: Option<i64>,
    pub spectrum_alignment_x: Option<i64>,
    pub spectrum_alignment_y: Option<i64>,
    pub det_spec_alignment_x: Option<i64>,
    pub det_spec_alignment_y: Option<i64>,
    pub det_map_alignment_x: Option<i64>,
    pub det_map_alignment_y: Option<i64>,

    pub magnification: Option<i64>,
}

pub(crate) fn push_param<T: Clone + Into<Value>>(params: &mut ParamMap, label: &str, value: &Option<T>) {
    if let Some(value) = value {
        params.insert(label.to_string(), value.clone().into());
    }
}

impl AcquisitionHeader {
    /// Combine the `date` and `time` fields, as written by the instrument
    /// (`01/Mar/2017` and `10:59`), into a timestamp.
    pub fn acquisition_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.as_deref()?.trim(), "%d/%b/%Y").ok()?;
        let time = self.time.as_deref()?.trim();
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .ok()?;
        Some(date.and_time(time))
    }

    /// Export the fields that are present under their parameter labels.
    pub fn parameters(&self) -> ParamMap {
        let mut params = ParamMap::new();
        push_param(&mut params, labels::DATE, &self.date);
        push_param(&mut params, labels::TIME, &self.time);
        push_param(&mut params, labels::COMMENT, &self.comment);
        push_param(&mut params, labels::ACQUISITION_SPEED, &self.dose_us);
        push_param(&mut params, labels::ENERGY_LOSS_EV, &self.energy_loss_ev);
        push_param(&mut params, labels::RAW, &self.raw);
        push_param(&mut params, labels::ENERGY_WIDTH_EV, &self.energy_width_ev);
        push_param(&mut params, labels::DUAL_DET_POSITION, &self.dual_det_position);
        push_param(&mut params, labels::DUAL_DET_POST, &self.dual_det_post);
        push_param(&mut params, labels::DUAL_DET_CENTER, &self.dual_det_center);
        push_param(&mut params, labels::Q1, &self.q1);
        push_param(&mut params, labels::Q1S, &self.q1s);
        push_param(&mut params, labels::Q2, &self.q2);
        push_param(&mut params, labels::Q2S, &self.q2s);
        push_param(&mut params, labels::Q3, &self.q3);
        push_param(&mut params, labels::Q3S, &self.q3s);
        push_param(&mut params, labels::H1, &self.h1);
        push_param(&mut params, labels::H1S, &self.h1s);
        push_param(&mut params, labels::H2, &self.h2);
        push_param(&mut params, labels::H2S, &self.h2s);
        push_param(&mut params, labels::H3, &self.h3);
        push_param(&mut params, labels::H3S, &self.h3s);
        push_param(&mut params, labels::H4, &self.h4);
        push_param(&mut params, labels::ELV_X, &self.elv_x);
        push_param(&mut params, labels::ELV_Y, &self.elv_y);
        push_param(&mut params, labels::SPECTRUM_ALIGNMENT_X, &self.spectrum_alignment_x);
        push_param(&mut params, labels::SPECTRUM_ALIGNMENT_Y, &self.spectrum_alignment_y);
        push_param(&mut params, labels::DET_SPEC_ALIGNMENT_X, &self.det_spec_alignment_x);
        push_param(&mut params, labels::DET_SPEC_ALIGNMENT_Y, &self.det_spec_alignment_y);
        push_param(&mut params, labels::DET_MAP_ALIGNMENT_X, &self.det_map_alignment_x);
        push_param(&mut params, labels::DET_MAP_ALIGNMENT_Y, &self.det_map_alignment_y);
        push_param(&mut params, labels::MAGNIFICATION, &self.magnification);
        params
    }
}
