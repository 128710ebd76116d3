//! # Duration Symbols and Decomposition
//!
//! Notated durations are measured in *divisions*: one quarter note is
//! [`DIVISIONS_PER_QUARTER`] divisions for the whole document, so tied
//! fragments always add up exactly.
//!
//! ## Vocabulary
//! ```text
//! breve   192   ddwhole 168   dwhole  144   whole    96
//! ddhalf   84   dhalf    72   half     48   ddquarter 42
//! dquarter 36   quarter  24   ddeighth 21   deighth   18
//! eighth   12   d16th     9   16th      6   32nd       3
//! ```
//! A dot multiplies the base value by 1.5, two dots by 1.75. Dotted values
//! that are not whole divisions (dotted 32nd, double-dotted 16th) are never
//! produced by [`decompose`].
//!
//! ## Decomposition
//! [`decompose`] is greedy: it repeatedly takes the largest symbol that fits
//! the remaining length, allowing the symbol to overshoot by
//! [`JITTER_TOLERANCE`] divisions so that timing jitter from the performance
//! (a quarter note that rounds to 23) still maps to the obvious symbol.
//!
//! ```
//! use notate::duration::decompose;
//!
//! assert_eq!(decompose(24).to_string(), "quarter");
//! assert_eq!(decompose(60).to_string(), "half+eighth");
//! assert!(decompose(0).is_empty());
//! ```

use std::fmt;
#[cfg(test)]
use std::str::FromStr;

#[cfg(test)]
use crate::error::NotateError;

/// Divisions per quarter note, fixed for every measure of every part.
pub const DIVISIONS_PER_QUARTER: u32 = 24;

/// How far (in divisions) a chosen symbol may exceed the remaining length.
pub const JITTER_TOLERANCE: u32 = 1;

/// Remaining lengths below this are shorter than any symbol worth emitting.
const MIN_DECOMPOSABLE: i64 = 4;

/// Undotted note value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoteType {
    ThirtySecond,
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Whole,
    Breve,
}

impl NoteType {
    /// Length in divisions
    pub fn divisions(&self) -> u32 {
        match self {
            NoteType::ThirtySecond => DIVISIONS_PER_QUARTER / 8,
            NoteType::Sixteenth => DIVISIONS_PER_QUARTER / 4,
            NoteType::Eighth => DIVISIONS_PER_QUARTER / 2,
            NoteType::Quarter => DIVISIONS_PER_QUARTER,
            NoteType::Half => DIVISIONS_PER_QUARTER * 2,
            NoteType::Whole => DIVISIONS_PER_QUARTER * 4,
            NoteType::Breve => DIVISIONS_PER_QUARTER * 8,
        }
    }

    /// MusicXML type name
    pub fn musicxml_type(&self) -> &'static str {
        match self {
            NoteType::ThirtySecond => "32nd",
            NoteType::Sixteenth => "16th",
            NoteType::Eighth => "eighth",
            NoteType::Quarter => "quarter",
            NoteType::Half => "half",
            NoteType::Whole => "whole",
            NoteType::Breve => "breve",
        }
    }

    #[cfg(test)]
    fn from_musicxml_type(name: &str) -> Option<Self> {
        match name {
            "32nd" => Some(NoteType::ThirtySecond),
            "16th" => Some(NoteType::Sixteenth),
            "eighth" => Some(NoteType::Eighth),
            "quarter" => Some(NoteType::Quarter),
            "half" => Some(NoteType::Half),
            "whole" => Some(NoteType::Whole),
            "breve" => Some(NoteType::Breve),
            _ => None,
        }
    }
}

/// A single notated duration: a note value plus zero, one or two dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationSymbol {
    pub base: NoteType,
    pub dots: u8,
}

impl DurationSymbol {
    pub const fn new(base: NoteType, dots: u8) -> Self {
        Self { base, dots }
    }

    /// Length in divisions, rounded to the nearest division (ties to even).
    pub fn divisions(&self) -> u32 {
        let multiplier = match self.dots {
            0 => 1.0,
            1 => 1.5,
            _ => 1.75,
        };
        (self.base.divisions() as f64 * multiplier).round_ties_even() as u32
    }
}

impl fmt::Display for DurationSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.dots {
            f.write_str("d")?;
        }
        f.write_str(self.base.musicxml_type())
    }
}

#[cfg(test)]
impl FromStr for DurationSymbol {
    type Err = NotateError;

    /// Parses `quarter`, `dquarter`, `ddquarter`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // No base name starts with 'd', so a leading 'd' is always a dot.
        let (dots, name) = if let Some(rest) = trimmed.strip_prefix("dd") {
            (2, rest)
        } else if let Some(rest) = trimmed.strip_prefix('d') {
            (1, rest)
        } else {
            (0, trimmed)
        };
        NoteType::from_musicxml_type(name)
            .map(|base| DurationSymbol::new(base, dots))
            .ok_or_else(|| NotateError::InputError(format!("Unknown duration symbol '{}'", s)))
    }
}

/// Symbols the decomposer may choose from, longest first.
const VOCABULARY: [DurationSymbol; 16] = [
    DurationSymbol::new(NoteType::Breve, 0),
    DurationSymbol::new(NoteType::Whole, 2),
    DurationSymbol::new(NoteType::Whole, 1),
    DurationSymbol::new(NoteType::Whole, 0),
    DurationSymbol::new(NoteType::Half, 2),
    DurationSymbol::new(NoteType::Half, 1),
    DurationSymbol::new(NoteType::Half, 0),
    DurationSymbol::new(NoteType::Quarter, 2),
    DurationSymbol::new(NoteType::Quarter, 1),
    DurationSymbol::new(NoteType::Quarter, 0),
    DurationSymbol::new(NoteType::Eighth, 2),
    DurationSymbol::new(NoteType::Eighth, 1),
    DurationSymbol::new(NoteType::Eighth, 0),
    DurationSymbol::new(NoteType::Sixteenth, 1),
    DurationSymbol::new(NoteType::Sixteenth, 0),
    DurationSymbol::new(NoteType::ThirtySecond, 0),
];

const SHORTEST: DurationSymbol = DurationSymbol::new(NoteType::ThirtySecond, 0);

/// An ordered sequence of symbols tied together to express one length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundDuration(pub Vec<DurationSymbol>);

impl CompoundDuration {
    pub fn symbols(&self) -> &[DurationSymbol] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The symbol, when the length needs exactly one.
    pub fn single(&self) -> Option<DurationSymbol> {
        match self.0.as_slice() {
            [symbol] => Some(*symbol),
            _ => None,
        }
    }

    /// Sum of the symbols' nominal lengths.
    pub fn total_divisions(&self) -> u32 {
        self.0.iter().map(DurationSymbol::divisions).sum()
    }
}

impl fmt::Display for CompoundDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl FromStr for CompoundDuration {
    type Err = NotateError;

    /// Parses `half+eighth`. The empty string is the empty duration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(CompoundDuration::default());
        }
        s.split('+')
            .map(DurationSymbol::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(CompoundDuration)
    }
}

/// Split a length in divisions into notated symbols, longest first.
///
/// Any residual shorter than a 32nd note left after the loop is dropped,
/// except when nothing has been emitted yet, in which case the length is
/// written as a single 32nd.
pub fn decompose(divisions: u32) -> CompoundDuration {
    let mut remaining = divisions as i64;
    let mut symbols = Vec::new();

    while remaining >= MIN_DECOMPOSABLE {
        let limit = remaining + JITTER_TOLERANCE as i64;
        let symbol = VOCABULARY
            .iter()
            .copied()
            .find(|s| s.divisions() as i64 <= limit)
            .unwrap_or(SHORTEST);
        remaining -= symbol.divisions() as i64;
        symbols.push(symbol);
    }

    if symbols.is_empty() && remaining > 0 {
        symbols.push(SHORTEST);
    }

    CompoundDuration(symbols)
}
