//! The two phase line state machine shared by the text readers and the
//! accumulator for the calibrated spectrum table.

use log::{debug, warn};

use crate::params::ParamMap;
use crate::spectrum::RawSpectrumRecord;

use super::tokenize::NumericRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Header,
    Table,
}

/// What a line means to the state machine, independent of its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// A line that is not a numeric row
    Text,
    /// A line made only of numbers
    Numeric,
    /// A keyword that ends the header, after it has been applied
    Sentinel,
    /// A line opening a new per-point section
    SectionMarker,
}

/// The parser position within a file: which phase it is in, and the zero
/// based index of the last section marker seen, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserState {
    pub phase: Phase,
    pub section: Option<usize>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the state that follows `event`. Leaving the header is one way,
    /// and section markers only count once the table has started.
    pub fn advance(self, event: LineEvent) -> Self {
        match (self.phase, event) {
            (Phase::Header, LineEvent::Numeric | LineEvent::Sentinel) => Self {
                phase: Phase::Table,
                ..self
            },
            (Phase::Table, LineEvent::SectionMarker) => Self {
                section: Some(self.section.map_or(0, |s| s + 1)),
                ..self
            },
            _ => self,
        }
    }

    pub fn in_header(&self) -> bool {
        self.phase == Phase::Header
    }
}

/// Collects the energy/count pairs and the gain correction and dark current
/// blocks that follow them.
#[derive(Debug, Clone)]
pub struct CalibratedTable {
    channel_count: usize,
    pub energies: Vec<f64>,
    pub counts: Vec<f64>,
    pub gain_corrections: Vec<f64>,
    pub dark_currents: Vec<f64>,
}

impl CalibratedTable {
    pub fn new(channel_count: usize) -> Self {
        Self {
            channel_count,
            energies: Vec::with_capacity(channel_count),
            counts: Vec::with_capacity(channel_count),
            gain_corrections: Vec::with_capacity(channel_count),
            dark_currents: Vec::with_capacity(channel_count),
        }
    }

    /// Route a numeric row. Returns `false` if the row has no place in a
    /// single spectrum table.
    pub fn push_row(&mut self, row: &NumericRow) -> bool {
        match row {
            NumericRow::Pair(energy, count) => {
                self.energies.push(*energy);
                self.counts.push(*count);
            }
            NumericRow::Single(value) => {
                if self.gain_corrections.len() < self.channel_count {
                    self.gain_corrections.push(*value);
                } else {
                    self.dark_currents.push(*value);
                }
            }
            NumericRow::Wide(..) => return false,
        }
        true
    }

    /// Trim the dark current block when a trailing line overflowed it by one
    /// value, leaving longer overflows in place.
    fn trim_dark_currents(&mut self) {
        let overflow = self.dark_currents.len().saturating_sub(self.channel_count);
        match overflow {
            0 => {}
            1 => {
                let dropped = self.dark_currents.pop();
                debug!("Dropped trailing dark current value {dropped:?}");
            }
            n => {
                warn!(
                    "Dark current block overflows the {} channel block by {n} values",
                    self.channel_count
                );
            }
        }
    }

    pub fn finish(mut self, header_parameters: ParamMap) -> RawSpectrumRecord {
        self.trim_dark_currents();
        RawSpectrumRecord {
            energies: self.energies,
            raw_counts: self.counts,
            gain_corrections: self.gain_corrections,
            dark_currents: self.dark_currents,
            header_parameters,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let state = ParserState::new();
        assert!(state.in_header());
        assert_eq!(state.advance(LineEvent::Text), state);
        // Section markers in the header are not counted
        assert_eq!(state.advance(LineEvent::SectionMarker), state);

        let table = state.advance(LineEvent::Numeric);
        assert_eq!(table.phase, Phase::Table);
        assert_eq!(table.section, None);
        assert_eq!(state.advance(LineEvent::Sentinel).phase, Phase::Table);

        let first = table.advance(LineEvent::SectionMarker);
        assert_eq!(first.section, Some(0));
        let second = first
            .advance(LineEvent::Numeric)
            .advance(LineEvent::Text)
            .advance(LineEvent::SectionMarker);
        assert_eq!(second.section, Some(1));
        assert_eq!(second.phase, Phase::Table);
    }

    #[test]
    fn test_gain_then_dark() {
        let mut table = CalibratedTable::new(3);
        table.push_row(&NumericRow::Pair(0.0, 5.0));
        for v in [1.0, 2.0, 3.0, 10.0, 20.0, 30.0] {
            assert!(table.push_row(&NumericRow::Single(v)));
        }
        assert!(!table.push_row(&NumericRow::Wide(0.0, vec![1.0, 2.0])));
        assert_eq!(table.gain_corrections, vec![1.0, 2.0, 3.0]);
        assert_eq!(table.dark_currents, vec![10.0, 20.0, 30.0]);
        assert_eq!(table.energies, vec![0.0]);
    }

    #[test_log::test]
    fn test_trailing_dark_trim() {
        let mut table = CalibratedTable::new(2);
        for v in [1.0, 1.0, 0.0, 0.0, 9.0] {
            table.push_row(&NumericRow::Single(v));
        }
        let rec = table.finish(ParamMap::new());
        assert_eq!(rec.dark_currents, vec![0.0, 0.0]);

        let mut table = CalibratedTable::new(2);
        for v in [1.0, 1.0, 0.0, 0.0, 9.0, 9.0] {
            table.push_row(&NumericRow::Single(v));
        }
        let rec = table.finish(ParamMap::new());
        assert_eq!(rec.dark_currents.len(), 4);
    }
}
