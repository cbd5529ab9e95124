use std::fmt::Display;
use std::str;

use indexmap::IndexMap;

/// A typed header value. Unit suffixes have already been stripped and
/// the numeric part scaled to the unit the field is stored in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are widened, strings are not coerced
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::String(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::String(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Conversion out of a [`Value`] into the concrete type a record field stores.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        value.to_i64()
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        value.to_f64()
    }
}

/// An ordered mapping from parameter label to value. Insertion order follows
/// the order the labels are exported in.
pub type ParamMap = IndexMap<String, Value>;

/// Units that a header field's value might carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    // Energy
    Electronvolt,

    // Time
    Microsecond,
    Millisecond,

    // Detector position
    Channel,

    // Length
    Millimeter,

    // Potential
    Volt,

    #[default]
    Unknown,
}

impl Unit {
    /// The literal the instrument software writes after a value in this unit
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Electronvolt => "eV",
            Self::Microsecond => "µs",
            Self::Millisecond => "ms",
            Self::Channel => "ch",
            Self::Millimeter => "mm",
            Self::Volt => "Volt",
            Self::Unknown => "",
        }
    }

    pub fn from_suffix(suffix: &str) -> Unit {
        match suffix {
            "eV" => Self::Electronvolt,
            "µs" | "us" => Self::Microsecond,
            "ms" => Self::Millisecond,
            "ch" => Self::Channel,
            "mm" => Self::Millimeter,
            "Volt" | "V" => Self::Volt,
            _ => Self::Unknown,
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Split a unit-suffixed literal like `"7.0eV"` into its numeric text and the
/// trailing two characters. Character based, so `"500µs"` splits as `("500", "µs")`.
pub fn split_unit_suffix(value: &str) -> Option<(&str, &str)> {
    let mut indices = value.char_indices().rev();
    indices.next()?;
    let (at, _) = indices.next()?;
    Some((&value[..at], &value[at..]))
}
