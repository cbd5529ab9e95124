//! Readers for the `.ana` analysis exports, both the single point spectrum and
//! the spectral imaging map variant.
//!
//! Both share a header terminated by the `Mag` keyword. The map variant follows
//! it with rows holding one count per map point, and repeats the table once
//! per acquisition section, each introduced by a `raw data` marker line.

mod map;
mod point;

pub use map::{AnaMapFile, AnaMapReader, SECTION_MARKER};
pub use point::{AnaFile, AnaReader};

use crate::keyword_rule;
use crate::meta::AcquisitionHeader;

use super::header::{FieldKind, KeyMatch, KeywordRule, CHANNEL, ELECTRONVOLT, MICROSECOND};
use super::tokenize::LineToken;

type H = AcquisitionHeader;

pub static ANA_HEADER_RULES: &[KeywordRule<AcquisitionHeader>] = &[
    keyword_rule!(H, KeyMatch::Prefix("date"), FieldKind::Text, date),
    keyword_rule!(H, KeyMatch::Prefix("Time"), FieldKind::Text, time),
    keyword_rule!(H, KeyMatch::Prefix("comment"), FieldKind::Text, comment),
    keyword_rule!(H, KeyMatch::Prefix("Dose"), FieldKind::Quantity(MICROSECOND), dose_us),
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
    keyword_rule!(H, KeyMatch::Exact("Q3S"), FieldKind::Integer, q3s),
    keyword_rule!(H, KeyMatch::Exact("H1"), FieldKind::Integer, h1),
    keyword_rule!(H, KeyMatch::Exact("H1S"), FieldKind::Integer, h1s),
    keyword_rule!(H, KeyMatch::Exact("H2"), FieldKind::Integer, h2),
    keyword_rule!(H, KeyMatch::Exact("H2S"), FieldKind::Integer, h2s),
    keyword_rule!(H, KeyMatch::Exact("H3"), FieldKind::Integer, h3),
    keyword_rule!(H, KeyMatch::Exact("H3S"), FieldKind::Integer, h3s),
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
    keyword_rule!(H, KeyMatch::Prefix("Det. align-x"), FieldKind::Integer, det_map_alignment_x),
    keyword_rule!(H, KeyMatch::Prefix("Det. align-y"), FieldKind::Integer, det_map_alignment_y),
    keyword_rule!(H, KeyMatch::Prefix(HEADER_SENTINEL), FieldKind::Integer, magnification),
];

pub static ANA_ITEM_RULES: &[KeywordRule<AcquisitionHeader>] = &[
    keyword_rule!(H, KeyMatch::Prefix("LE"), FieldKind::Quantity(ELECTRONVOLT), energy_loss_ev),
    keyword_rule!(H, KeyMatch::Prefix("Raw"), FieldKind::Float, raw),
    keyword_rule!(
        H,
        KeyMatch::Prefix("Image det. position"),
        FieldKind::Quantity(CHANNEL),
        dual_det_position
    ),
    keyword_rule!(H, KeyMatch::Prefix("post"), FieldKind::Quantity(CHANNEL), dual_det_post),
];

/// The keyword of the last header line
pub const HEADER_SENTINEL: &str = "Mag";

fn is_header_sentinel(token: &LineToken<'_>) -> bool {
    matches!(token, LineToken::KeyValue(kv) if kv.keyword.starts_with(HEADER_SENTINEL))
}
