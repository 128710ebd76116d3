//! Pitch spelling: step, accidental and octave.
//!
//! Pitches are written `<step><accidental?><octave>` (`C4`, `F#3`, `Bb5`,
//! `C-1`). Sharps and flats may also be written with the Unicode signs, and an
//! explicit natural (`♮` or `n`) is accepted but never produces an alteration.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::NotateError;

/// Step names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// MusicXML `<alter>` value; naturals have none.
    pub fn alter(&self) -> Option<i8> {
        match self {
            Accidental::Natural => None,
            Accidental::Sharp => Some(1),
            Accidental::Flat => Some(-1),
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' | '♯' => Some(Accidental::Sharp),
            'b' | '♭' => Some(Accidental::Flat),
            'n' | '♮' => Some(Accidental::Natural),
            _ => None,
        }
    }
}

/// A spelled pitch. Octave 4 holds middle C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "PitchSpec")]
pub struct Pitch {
    pub step: Step,
    pub accidental: Accidental,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, accidental: Accidental, octave: i8) -> Self {
        Self {
            step,
            accidental,
            octave,
        }
    }

    /// Spell a MIDI note number with sharps (60 = C4, 61 = C#4).
    pub fn from_midi(number: u8) -> Self {
        const SPELLINGS: [(Step, Accidental); 12] = [
            (Step::C, Accidental::Natural),
            (Step::C, Accidental::Sharp),
            (Step::D, Accidental::Natural),
            (Step::D, Accidental::Sharp),
            (Step::E, Accidental::Natural),
            (Step::F, Accidental::Natural),
            (Step::F, Accidental::Sharp),
            (Step::G, Accidental::Natural),
            (Step::G, Accidental::Sharp),
            (Step::A, Accidental::Natural),
            (Step::A, Accidental::Sharp),
            (Step::B, Accidental::Natural),
        ];
        let (step, accidental) = SPELLINGS[(number % 12) as usize];
        Self::new(step, accidental, (number / 12) as i8 - 1)
    }
}

impl FromStr for Pitch {
    type Err = NotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NotateError::InvalidPitch(s.to_string());

        let mut chars = s.chars();
        let step = chars.next().and_then(Step::from_char).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (accidental, octave_text) = match rest.chars().next().and_then(Accidental::from_char) {
            Some(accidental) => {
                let width = rest.chars().next().map_or(0, char::len_utf8);
                (accidental, &rest[width..])
            }
            None => (Accidental::Natural, rest),
        };

        // i8 parsing would also accept a leading '+'
        if octave_text.starts_with('+') {
            return Err(invalid());
        }
        let octave = octave_text.parse::<i8>().map_err(|_| invalid())?;

        Ok(Pitch::new(step, accidental, octave))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.accidental {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        };
        write!(f, "{}{}{}", self.step.as_str(), accidental, self.octave)
    }
}

/// Pitch as written in an input document: a name or a MIDI number.
#[derive(Deserialize)]
#[serde(untagged)]
enum PitchSpec {
    Number(u8),
    Name(String),
}

impl TryFrom<PitchSpec> for Pitch {
    type Error = NotateError;

    fn try_from(spec: PitchSpec) -> Result<Self, Self::Error> {
        match spec {
            PitchSpec::Number(number) if number <= 127 => Ok(Pitch::from_midi(number)),
            PitchSpec::Number(number) => Err(NotateError::InvalidPitch(number.to_string())),
            PitchSpec::Name(name) => name.parse(),
        }
    }
}
