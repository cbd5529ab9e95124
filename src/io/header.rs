//! Keyword driven header parsing.
//!
//! Each header format is described by a static, ordered table of
//! [`KeywordRule`]s. A key-value pair is tested against the rules in order and
//! the first match converts the value according to its [`FieldKind`] and
//! stores it. More specific keys must come before shorter prefixes that would
//! also match them.

use log::debug;

use crate::params::{split_unit_suffix, Unit, Value};

use super::error::ParserError;
use super::tokenize::{Item, KeyValue, LineToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    Prefix(&'static str),
    Exact(&'static str),
}

impl KeyMatch {
    pub fn matches(&self, keyword: &str) -> bool {
        match self {
            Self::Prefix(prefix) => keyword.starts_with(prefix),
            Self::Exact(key) => keyword == *key,
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            Self::Prefix(s) | Self::Exact(s) => s,
        }
    }
}

/// An accepted unit and the factor converting it into the stored unit
pub type UnitScale = (Unit, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    /// A number immediately followed by a two character unit, `"7.0eV"`
    Quantity(&'static [UnitScale]),
    /// A number and a unit separated by whitespace, `"30000 Volt"`
    SpacedQuantity(&'static [UnitScale]),
}

/// What happened when a key-value pair was offered to a rule table
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Applied(&'static str),
    Unmatched,
    Malformed(String),
}

impl FieldOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

pub struct KeywordRule<T> {
    pub key: KeyMatch,
    pub kind: FieldKind,
    pub apply: fn(&mut T, Value),
}

impl<T> std::fmt::Debug for KeywordRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordRule")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Build a [`KeywordRule`] that stores the converted value in an `Option`
/// field of the target record.
#[macro_export]
macro_rules! keyword_rule {
    ($target:ty, $key:expr, $kind:expr, $field:ident) => {
        $crate::io::header::KeywordRule::<$target> {
            key: $key,
            kind: $kind,
            apply: |target: &mut $target, value: $crate::params::Value| {
                target.$field = $crate::params::FromValue::from_value(value)
            },
        }
    };
}

/// Look up the scale for the unit literal `found` among the accepted `units`
/// of `keyword`, failing with [`ParserError::UnitMismatch`] if it is not one of them.
pub fn unit_scale(keyword: &str, units: &[UnitScale], found: &str) -> Result<f64, ParserError> {
    let unit = Unit::from_suffix(found);
    units
        .iter()
        .find(|(u, _)| unit != Unit::Unknown && *u == unit)
        .map(|(_, s)| *s)
        .ok_or_else(|| ParserError::UnitMismatch {
            keyword: keyword.to_string(),
            expected: units.iter().map(|(u, _)| *u).collect(),
            found: found.to_string(),
        })
}

/// Convert the text of `value` according to `kind`.
///
/// A value that cannot be read as the requested type is `Ok(None)` and is
/// dropped by the caller. A well formed number carrying the wrong unit is an
/// error, since accepting it would silently corrupt a physical quantity.
pub fn convert_value(
    keyword: &str,
    value: &str,
    kind: &FieldKind,
) -> Result<Option<Value>, ParserError> {
    let converted = match kind {
        FieldKind::Text => Some(Value::String(value.to_string())),
        FieldKind::Integer => value.parse::<i64>().ok().map(Value::Int),
        FieldKind::Float => value.parse::<f64>().ok().map(Value::Float),
        FieldKind::Quantity(units) => {
            let Some((number, unit)) = split_unit_suffix(value) else {
                return Ok(None);
            };
            let Ok(number) = number.trim().parse::<f64>() else {
                return Ok(None);
            };
            Some(Value::Float(number * unit_scale(keyword, units, unit)?))
        }
        FieldKind::SpacedQuantity(units) => {
            let mut parts = value.split_whitespace();
            let (Some(number), Some(unit), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Ok(None);
            };
            let Ok(number) = number.parse::<f64>() else {
                return Ok(None);
            };
            Some(Value::Float(number * unit_scale(keyword, units, unit)?))
        }
    };
    Ok(converted)
}

/// Offer a key-value pair to an ordered rule table, storing it in `target`
/// through the first rule whose key matches.
pub fn dispatch<T>(
    rules: &[KeywordRule<T>],
    target: &mut T,
    kv: &KeyValue<'_>,
) -> Result<FieldOutcome, ParserError> {
    let Some(rule) = rules.iter().find(|rule| rule.key.matches(kv.keyword)) else {
        return Ok(FieldOutcome::Unmatched);
    };
    match convert_value(kv.keyword, kv.value, &rule.kind)? {
        Some(value) => {
            (rule.apply)(target, value);
            Ok(FieldOutcome::Applied(rule.key.literal()))
        }
        None => {
            debug!(
                "Could not read {:?} as {:?} for {}",
                kv.value, rule.kind, kv.keyword
            );
            Ok(FieldOutcome::Malformed(kv.keyword.to_string()))
        }
    }
}

/// Apply one header line to `target`.
///
/// A single `keyword=value` line goes to the line table `rules`, and is retried
/// against `item_rules` if the line table does not know the keyword or cannot
/// read its value. Each `keyword=value` item of a comma separated line goes to
/// `item_rules`. Anything else is skipped.
pub fn apply_header_line<T>(
    rules: &[KeywordRule<T>],
    item_rules: &[KeywordRule<T>],
    target: &mut T,
    token: &LineToken<'_>,
) -> Result<(), ParserError> {
    match token {
        LineToken::Empty => {}
        LineToken::KeyValue(kv) => {
            if !dispatch(rules, target, kv)?.is_applied()
                && !dispatch(item_rules, target, kv)?.is_applied()
            {
                debug!("Skipping unknown header field {}={}", kv.keyword, kv.value);
            }
        }
        LineToken::Items(items) => {
            for item in items {
                match item {
                    Item::KeyValue(kv) => {
                        dispatch(item_rules, target, kv)?;
                    }
                    Item::Bare(text) => {
                        debug!("Skipping header item {text:?}");
                    }
                }
            }
        }
    }
    Ok(())
}

/// Find the first pair of rules where an earlier key would capture the literal
/// of a later one, making the later rule unreachable.
pub fn find_shadowed_rule<T>(rules: &[KeywordRule<T>]) -> Option<(usize, usize)> {
    for (j, later) in rules.iter().enumerate() {
        for (i, earlier) in rules[..j].iter().enumerate() {
            if earlier.key.matches(later.key.literal()) {
                return Some((i, j));
            }
        }
    }
    None
}

pub const ELECTRONVOLT: &[UnitScale] = &[(Unit::Electronvolt, 1.0)];
pub const CHANNEL: &[UnitScale] = &[(Unit::Channel, 1.0)];
pub const MILLIMETER: &[UnitScale] = &[(Unit::Millimeter, 1.0)];
pub const VOLT: &[UnitScale] = &[(Unit::Volt, 1.0)];
/// Durations stored in microseconds
pub const MICROSECOND: &[UnitScale] = &[(Unit::Microsecond, 1.0), (Unit::Millisecond, 1.0e3)];
/// Durations stored in milliseconds
pub const MILLISECOND: &[UnitScale] = &[(Unit::Millisecond, 1.0), (Unit::Microsecond, 1.0e-3)];

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        name: Option<String>,
        count: Option<i64>,
        width: Option<f64>,
        dose: Option<f64>,
        voltage: Option<f64>,
    }

    static PROBE_RULES: &[KeywordRule<Probe>] = &[
        keyword_rule!(Probe, KeyMatch::Prefix("name"), FieldKind::Text, name),
        keyword_rule!(Probe, KeyMatch::Exact("N"), FieldKind::Integer, count),
        keyword_rule!(Probe, KeyMatch::Prefix("Energy Width"), FieldKind::Quantity(ELECTRONVOLT), width),
        keyword_rule!(Probe, KeyMatch::Prefix("dose"), FieldKind::Quantity(MICROSECOND), dose),
        keyword_rule!(Probe, KeyMatch::Prefix("Accelerating Voltage"), FieldKind::SpacedQuantity(VOLT), voltage),
    ];

    fn kv<'a>(keyword: &'a str, value: &'a str) -> KeyValue<'a> {
        KeyValue { keyword, value }
    }

    #[test]
    fn test_dispatch_kinds() -> Result<(), ParserError> {
        let mut probe = Probe::default();
        assert!(dispatch(PROBE_RULES, &mut probe, &kv("name1", "abc"))?.is_applied());
        assert!(dispatch(PROBE_RULES, &mut probe, &kv("N", "-600"))?.is_applied());
        assert!(dispatch(PROBE_RULES, &mut probe, &kv("Energy Width", "7.0eV"))?.is_applied());
        assert!(dispatch(PROBE_RULES, &mut probe, &kv("dose", "0.5ms"))?.is_applied());
        assert!(
            dispatch(PROBE_RULES, &mut probe, &kv("Accelerating Voltage", "30000 Volt"))?
                .is_applied()
        );
        assert_eq!(probe.name.as_deref(), Some("abc"));
        assert_eq!(probe.count, Some(-600));
        assert_eq!(probe.width, Some(7.0));
        assert_eq!(probe.dose, Some(500.0));
        assert_eq!(probe.voltage, Some(30000.0));
        Ok(())
    }

    #[test]
    fn test_exact_does_not_match_longer() -> Result<(), ParserError> {
        let mut probe = Probe::default();
        assert_eq!(
            dispatch(PROBE_RULES, &mut probe, &kv("NS", "4"))?,
            FieldOutcome::Unmatched
        );
        assert!(probe.count.is_none());
        Ok(())
    }

    #[test]
    fn test_unit_mismatch_is_fatal() {
        let mut probe = Probe::default();
        let err = dispatch(PROBE_RULES, &mut probe, &kv("Energy Width", "7.0ms")).unwrap_err();
        match err {
            ParserError::UnitMismatch {
                keyword,
                expected,
                found,
            } => {
                assert_eq!(keyword, "Energy Width");
                assert_eq!(expected, vec![Unit::Electronvolt]);
                assert_eq!(found, "ms");
            }
            other => panic!("Unexpected error {other}"),
        }
        assert!(probe.width.is_none());

        let err = dispatch(PROBE_RULES, &mut probe, &kv("Accelerating Voltage", "30 kV"));
        assert!(matches!(err, Err(ParserError::UnitMismatch { .. })));
    }

    #[test]
    fn test_malformed_values_are_dropped() -> Result<(), ParserError> {
        let mut probe = Probe::default();
        assert_eq!(
            dispatch(PROBE_RULES, &mut probe, &kv("N", "many"))?,
            FieldOutcome::Malformed("N".into())
        );
        // The number is checked before the unit
        assert!(!dispatch(PROBE_RULES, &mut probe, &kv("Energy Width", ""))?.is_applied());
        assert!(!dispatch(PROBE_RULES, &mut probe, &kv("Energy Width", "xxms"))?.is_applied());
        assert!(probe.count.is_none());
        assert!(probe.width.is_none());
        Ok(())
    }

    static PROBE_ITEM_RULES: &[KeywordRule<Probe>] = &[keyword_rule!(
        Probe,
        KeyMatch::Prefix("LE"),
        FieldKind::Quantity(ELECTRONVOLT),
        width
    )];

    #[test]
    fn test_header_line_fallback() -> Result<(), ParserError> {
        let mut probe = Probe::default();
        let token = crate::io::tokenize::tokenize_line("LE=3.5eV");
        apply_header_line(PROBE_RULES, PROBE_ITEM_RULES, &mut probe, &token)?;
        assert_eq!(probe.width, Some(3.5));

        let token = crate::io::tokenize::tokenize_line("N=4, LE=1.0eV, stray");
        apply_header_line(PROBE_RULES, PROBE_ITEM_RULES, &mut probe, &token)?;
        assert_eq!(probe.width, Some(1.0));
        // Items are only matched against the item table
        assert!(probe.count.is_none());
        Ok(())
    }

    #[test]
    fn test_shadowing_detection() {
        assert_eq!(find_shadowed_rule(PROBE_RULES), None);
        let shadowed: &[KeywordRule<Probe>] = &[
            keyword_rule!(Probe, KeyMatch::Prefix("Energy"), FieldKind::Text, name),
            keyword_rule!(Probe, KeyMatch::Prefix("Energy Width"), FieldKind::Quantity(ELECTRONVOLT), width),
        ];
        assert_eq!(find_shadowed_rule(shadowed), Some((0, 1)));
    }
}
