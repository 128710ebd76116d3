//! # Measure Attributes
//!
//! Every encoded measure carries an attributes block: divisions per quarter
//! note, key signature, time signature and clef. The block is resolved by the
//! encoder from the change lists and written by [`write_attributes`], which
//! is total: any clef name it does not recognise falls back to treble.
//!
//! ## Clef Selection
//! A part uses a single clef for its whole length. [`Clef::for_pitches`]
//! votes over every note of the track: octave 4 and above counts towards
//! treble, anything lower towards bass, and a tie goes to treble.

use crate::duration::DIVISIONS_PER_QUARTER;
use crate::error::NotateError;
use crate::pitch::Pitch;

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

impl TimeSignature {
    pub fn new(beats: u8, beat_type: u8) -> Result<Self, NotateError> {
        if beats == 0 || beat_type == 0 {
            return Err(NotateError::InvalidTimeSignature {
                numerator: beats,
                denominator: beat_type,
            });
        }
        Ok(Self { beats, beat_type })
    }

    /// Length of one measure in divisions, rounded to the nearest division.
    ///
    /// 4/4 = 96, 3/4 = 72, 6/8 = 72, 5/8 = 60
    pub fn divisions_per_measure(&self) -> u32 {
        let whole_notes = self.beats as f64 / self.beat_type as f64;
        (whole_notes * 4.0 * DIVISIONS_PER_QUARTER as f64).round_ties_even() as u32
    }
}

/// Mode for key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// Key signature (number of sharps/flats)
/// Positive = sharps, Negative = flats, Zero = C major / A minor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeySignature {
    pub fifths: i8,
    pub mode: Mode,
}

impl KeySignature {
    /// Resolve a MIDI-style key number: 0-11 is the tonic pitch class of a
    /// major key, 12-23 the tonic pitch class of a minor key plus 12.
    pub fn from_key_number(key_number: u8) -> Result<Self, NotateError> {
        // Fifths of the major key on each tonic pitch class, C through B
        const MAJOR_FIFTHS: [i8; 12] = [0, -5, 2, -3, 4, -1, 6, 1, -4, 3, -2, 5];

        match key_number {
            0..=11 => Ok(Self {
                fifths: MAJOR_FIFTHS[key_number as usize],
                mode: Mode::Major,
            }),
            12..=23 => {
                // Relative major is a minor third above the minor tonic
                let relative_major = (key_number + 3) % 12;
                Ok(Self {
                    fifths: MAJOR_FIFTHS[relative_major as usize],
                    mode: Mode::Minor,
                })
            }
            _ => Err(NotateError::InvalidKey(key_number)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clef {
    #[default]
    Treble,
    Bass,
}

impl Clef {
    /// `"bass"` selects the bass clef; every other name is treble.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bass" => Clef::Bass,
            _ => Clef::Treble,
        }
    }

    /// MusicXML clef sign
    pub fn sign(&self) -> &'static str {
        match self {
            Clef::Treble => "G",
            Clef::Bass => "F",
        }
    }

    /// Staff line the sign sits on
    pub fn line(&self) -> u8 {
        match self {
            Clef::Treble => 2,
            Clef::Bass => 4,
        }
    }

    /// Majority vote over a track's pitches. Ties and empty tracks are treble.
    pub fn for_pitches<'a>(pitches: impl IntoIterator<Item = &'a Pitch>) -> Self {
        let (treble, bass) = pitches
            .into_iter()
            .fold((0usize, 0usize), |(treble, bass), pitch| {
                if pitch.octave >= 4 {
                    (treble + 1, bass)
                } else {
                    (treble, bass + 1)
                }
            });
        if treble >= bass {
            Clef::Treble
        } else {
            Clef::Bass
        }
    }
}

/// Attributes block written at the top of every measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    pub divisions: u32,
    pub fifths: i8,
    pub time: TimeSignature,
    pub clef: Clef,
}

/// Build the attributes block for a measure from already-resolved values.
pub fn write_attributes(key_fifths: i8, time: TimeSignature, clef: Clef) -> Attributes {
    Attributes {
        divisions: DIVISIONS_PER_QUARTER,
        fifths: key_fifths,
        time,
        clef,
    }
}
