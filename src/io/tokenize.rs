//! Splitting raw instrument text lines into `keyword=value` pairs and
//! comma separated items.
//!
//! A line holding exactly one `=` is a single key-value pair. Any other line
//! is split on `,` and every item is classified independently, so a line
//! like `LE=0.0eV, Raw=98.7` yields two pairs and `-32.00,2282` yields two
//! bare numeric items.

/// A `keyword=value` pair with surrounding whitespace trimmed from both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValue<'a> {
    pub keyword: &'a str,
    pub value: &'a str,
}

impl<'a> KeyValue<'a> {
    /// Split `text` on its only `=`. Fails if there is no `=` or more than one.
    pub fn split(text: &'a str) -> Option<Self> {
        let (keyword, value) = text.split_once('=')?;
        if value.contains('=') {
            return None;
        }
        Some(Self {
            keyword: keyword.trim(),
            value: value.trim(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    KeyValue(KeyValue<'a>),
    Bare(&'a str),
}

impl<'a> Item<'a> {
    pub fn as_key_value(&self) -> Option<&KeyValue<'a>> {
        match self {
            Self::KeyValue(kv) => Some(kv),
            Self::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    Empty,
    KeyValue(KeyValue<'a>),
    Items(Vec<Item<'a>>),
}

impl<'a> LineToken<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub fn tokenize_line(line: &str) -> LineToken<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineToken::Empty;
    }
    if let Some(kv) = KeyValue::split(trimmed) {
        return LineToken::KeyValue(kv);
    }
    let items = trimmed
        .split(',')
        .map(|item| {
            let item = item.trim();
            match KeyValue::split(item) {
                Some(kv) => Item::KeyValue(kv),
                None => Item::Bare(item),
            }
        })
        .collect();
    LineToken::Items(items)
}

/// The shape of a line made only of numbers
#[derive(Debug, Clone, PartialEq)]
pub enum NumericRow {
    /// A calibration value, gain correction or dark current
    Single(f64),
    /// An energy and a count
    Pair(f64, f64),
    /// An energy followed by one count per map point
    Wide(f64, Vec<f64>),
}

impl NumericRow {
    pub fn energy(&self) -> Option<f64> {
        match self {
            Self::Single(_) => None,
            Self::Pair(e, _) | Self::Wide(e, _) => Some(*e),
        }
    }

    pub fn counts(&self) -> &[f64] {
        match self {
            Self::Single(_) => &[],
            Self::Pair(_, c) => std::slice::from_ref(c),
            Self::Wide(_, cs) => cs,
        }
    }
}

/// Classify a tokenized line as a numeric row, if every item is a bare number.
pub fn numeric_row(token: &LineToken<'_>) -> Option<NumericRow> {
    let items = match token {
        LineToken::Items(items) => items,
        _ => return None,
    };
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Bare(text) => values.push(text.parse::<f64>().ok()?),
            Item::KeyValue(_) => return None,
        }
    }
    match values.len() {
        0 => None,
        1 => Some(NumericRow::Single(values[0])),
        2 => Some(NumericRow::Pair(values[0], values[1])),
        _ => {
            let energy = values.remove(0);
            Some(NumericRow::Wide(energy, values))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_value_line() {
        let token = tokenize_line("date=01/Mar/2017\r");
        assert_eq!(
            token,
            LineToken::KeyValue(KeyValue {
                keyword: "date",
                value: "01/Mar/2017"
            })
        );

        let token = tokenize_line("Energy Window Width = 7.0eV ");
        assert_eq!(
            token,
            LineToken::KeyValue(KeyValue {
                keyword: "Energy Window Width",
                value: "7.0eV"
            })
        );

        // A value may hold commas when there is only one `=`
        let token = tokenize_line("comment=first, second");
        assert_eq!(
            token,
            LineToken::KeyValue(KeyValue {
                keyword: "comment",
                value: "first, second"
            })
        );
    }

    #[test]
    fn test_multi_key_line() {
        let token = tokenize_line("LE=0.0eV, Raw=98.7,junk, =");
        match token {
            LineToken::Items(items) => {
                assert_eq!(items.len(), 4);
                assert_eq!(
                    items[0].as_key_value(),
                    Some(&KeyValue {
                        keyword: "LE",
                        value: "0.0eV"
                    })
                );
                assert_eq!(items[1].as_key_value().unwrap().value, "98.7");
                assert_eq!(items[2], Item::Bare("junk"));
                assert_eq!(
                    items[3],
                    Item::KeyValue(KeyValue {
                        keyword: "",
                        value: ""
                    })
                );
            }
            other => panic!("Expected items, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_rows() {
        assert_eq!(
            numeric_row(&tokenize_line("-32.00,2282")),
            Some(NumericRow::Pair(-32.0, 2282.0))
        );
        assert_eq!(
            numeric_row(&tokenize_line("0.918375")),
            Some(NumericRow::Single(0.918375))
        );
        assert_eq!(
            numeric_row(&tokenize_line("-32.00, 4, 5, 6")),
            Some(NumericRow::Wide(-32.0, vec![4.0, 5.0, 6.0]))
        );
        assert_eq!(numeric_row(&tokenize_line("-32.00,abc")), None);
        assert_eq!(numeric_row(&tokenize_line("raw data 1")), None);
        assert_eq!(numeric_row(&tokenize_line("Mag=37443")), None);
        assert_eq!(numeric_row(&tokenize_line("")), None);
        assert!(tokenize_line("  \t").is_empty());
    }
}
