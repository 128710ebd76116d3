//! # Performance Timeline
//!
//! The encoder's input: note events on a continuous time axis plus the
//! measure grid (downbeats, time-signature changes, key-signature changes)
//! that a MIDI analysis step derived from the same performance. All times
//! share one unit, typically seconds.
//!
//! A [`Performance`] is read from YAML:
//!
//! ```
//! use notate::Performance;
//!
//! let source = r#"
//! downbeats: [0.0, 2.0]
//! time-signatures:
//!   - { time: 0.0, numerator: 4, denominator: 4 }
//! key-signatures:
//!   - { time: 0.0, key-number: 0 }
//! tracks:
//!   - name: Flute
//!     notes:
//!       - { start: 0.0, end: 2.0, pitch: C5 }
//!       - { start: 2.0, end: 4.0, pitch: 74 }
//! "#;
//!
//! let performance = Performance::from_yaml(source)?;
//! assert_eq!(performance.tracks[0].notes.len(), 2);
//! assert_eq!(performance.end_time(), 4.0);
//! # Ok::<(), notate::NotateError>(())
//! ```

use serde::Deserialize;

use crate::attributes::{KeySignature, TimeSignature};
use crate::error::NotateError;
use crate::pitch::Pitch;
use crate::score::Metadata;

/// A sounding note between `start` and `end`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NoteEvent {
    pub start: f64,
    pub end: f64,
    pub pitch: Pitch,
}

impl NoteEvent {
    pub fn new(start: f64, end: f64, pitch: Pitch) -> Self {
        Self { start, end, pitch }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_drum: bool,
    #[serde(default)]
    pub notes: Vec<NoteEvent>,
}

impl Track {
    /// Drop notes that end at or before they start. Returns how many went.
    pub fn remove_invalid_notes(&mut self) -> usize {
        let before = self.notes.len();
        self.notes.retain(|note| note.end > note.start);
        before - self.notes.len()
    }

    /// Order notes by start time, keeping the input order of simultaneous notes.
    pub fn sort_notes(&mut self) {
        self.notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawTimeSignatureChange")]
pub struct TimeSignatureChange {
    pub time: f64,
    pub signature: TimeSignature,
}

#[derive(Deserialize)]
struct RawTimeSignatureChange {
    time: f64,
    numerator: u8,
    denominator: u8,
}

impl TryFrom<RawTimeSignatureChange> for TimeSignatureChange {
    type Error = NotateError;

    fn try_from(raw: RawTimeSignatureChange) -> Result<Self, Self::Error> {
        Ok(Self {
            time: raw.time,
            signature: TimeSignature::new(raw.numerator, raw.denominator)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawKeySignatureChange")]
pub struct KeySignatureChange {
    pub time: f64,
    pub key: KeySignature,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawKeySignatureChange {
    time: f64,
    key_number: u8,
}

impl TryFrom<RawKeySignatureChange> for KeySignatureChange {
    type Error = NotateError;

    fn try_from(raw: RawKeySignatureChange) -> Result<Self, Self::Error> {
        Ok(Self {
            time: raw.time,
            key: KeySignature::from_key_number(raw.key_number)?,
        })
    }
}

/// The measure grid shared by every track of a performance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingMap {
    /// Start time of every measure, increasing
    pub downbeats: Vec<f64>,
    /// Increasing by time; empty means 4/4 throughout
    pub time_signatures: Vec<TimeSignatureChange>,
    /// Increasing by time; empty means C major throughout
    pub key_signatures: Vec<KeySignatureChange>,
    /// End of the last measure
    pub end_time: f64,
}

impl TimingMap {
    pub fn measure_count(&self) -> usize {
        self.downbeats.len()
    }

    /// Start of measure `index` and the start of the next one (or the end of
    /// the piece for the last measure). `None` past the last measure.
    pub fn window(&self, index: usize) -> Option<(f64, f64)> {
        let start = *self.downbeats.get(index)?;
        let end = self.downbeats.get(index + 1).copied().unwrap_or(self.end_time);
        Some((start, end))
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.downbeats.len()
    }
}

/// A complete performance as read from an input document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Performance {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub downbeats: Vec<f64>,
    #[serde(default)]
    pub time_signatures: Vec<TimeSignatureChange>,
    #[serde(default)]
    pub key_signatures: Vec<KeySignatureChange>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Performance {
    /// Read a performance from YAML, dropping zero-length notes and sorting
    /// every track by start time.
    pub fn from_yaml(source: &str) -> Result<Self, NotateError> {
        let mut performance: Performance =
            serde_yaml::from_str(source).map_err(|e| NotateError::InputError(e.to_string()))?;
        performance.prepare();
        Ok(performance)
    }

    pub fn prepare(&mut self) {
        for track in &mut self.tracks {
            let removed = track.remove_invalid_notes();
            if removed > 0 {
                log::warn!(
                    "Dropped {} note(s) with non-positive duration from track '{}'",
                    removed,
                    track.name
                );
            }
            track.sort_notes();
        }
    }

    /// Explicit end time, else the latest note end, else the last downbeat.
    pub fn end_time(&self) -> f64 {
        if let Some(end) = self.end_time {
            return end;
        }
        self.tracks
            .iter()
            .flat_map(|track| track.notes.iter().map(|note| note.end))
            .chain(self.downbeats.last().copied())
            .fold(0.0, f64::max)
    }

    pub fn timing(&self) -> TimingMap {
        TimingMap {
            downbeats: self.downbeats.clone(),
            time_signatures: self.time_signatures.clone(),
            key_signatures: self.key_signatures.clone(),
            end_time: self.end_time(),
        }
    }
}
