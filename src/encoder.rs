//! # Measure Encoder
//!
//! Walks one track through the measure grid and writes each measure as a
//! sequence of notes, rests and cursor markers.
//!
//! ## The Walk
//! Measures are visited in downbeat order. Within a measure a cursor tracks
//! how many divisions have been written since the downbeat, and a voice
//! counter starts at 1. Each note of the track is placed relative to the
//! measure window:
//!
//! - **Starts here**: the cursor is moved to the note's offset, with a
//!   `Forward` marker when the note starts after the cursor (back to voice 1)
//!   or a `Backup` marker when it starts before it (next voice). A note that
//!   runs past the next downbeat is cut there and tied out.
//! - **Carried in**: the note began in an earlier measure and still sounds at
//!   this downbeat. The cursor is backed up to the downbeat (next voice) and
//!   the note is written tied in, either up to its end or, if it also runs
//!   past the next downbeat, across the whole measure.
//! - Anything else does not sound in this measure.
//!
//! A note whose share of the measure rounds to no divisions is skipped along
//! with its marker. A measure in which nothing sounds is filled with one rest.
//!
//! ## Positions
//! Times are mapped to divisions by scaling against the measure's own length:
//! `round((t - downbeat) / (next_downbeat - downbeat) * divisions_per_measure)`
//! with halves rounded to even. The last measure ends at the piece's end time.
//!
//! ## State
//! The time- and key-signature pointers only move forward, so measures must be
//! encoded in order. All state lives in the [`MeasureEncoder`] for one track;
//! tracks never share it.

use crate::attributes::{write_attributes, Attributes, Clef, KeySignature, TimeSignature};
use crate::duration::decompose;
use crate::fragment::{build_note, build_rest};
use crate::score::{Measure, MeasureElement};
use crate::timeline::{NoteEvent, TimingMap};

/// Encode a track's notes into measures along the given grid.
///
/// Notes must have positive length; [`Track::remove_invalid_notes`] does this.
///
/// [`Track::remove_invalid_notes`]: crate::timeline::Track::remove_invalid_notes
pub fn encode(notes: &[NoteEvent], timing: &TimingMap) -> Vec<Measure> {
    MeasureEncoder::new(notes, timing).collect()
}

/// Per-track encoding state. Yields one [`Measure`] per downbeat.
pub struct MeasureEncoder<'a> {
    notes: &'a [NoteEvent],
    timing: &'a TimingMap,
    clef: Clef,
    index: usize,
    time_index: usize,
    key_index: usize,
}

impl<'a> MeasureEncoder<'a> {
    pub fn new(notes: &'a [NoteEvent], timing: &'a TimingMap) -> Self {
        Self {
            notes,
            timing,
            clef: Clef::for_pitches(notes.iter().map(|note| &note.pitch)),
            index: 0,
            time_index: 0,
            key_index: 0,
        }
    }

    /// Time signature in force at `downbeat`, advancing the pointer.
    fn current_time_signature(&mut self, downbeat: f64) -> TimeSignature {
        let changes = &self.timing.time_signatures;
        while self.time_index + 1 < changes.len() && downbeat >= changes[self.time_index + 1].time {
            self.time_index += 1;
        }
        changes
            .get(self.time_index)
            .map(|change| change.signature)
            .unwrap_or_default()
    }

    /// Key signature in force at `downbeat`, advancing the pointer.
    fn current_key_signature(&mut self, downbeat: f64) -> KeySignature {
        let changes = &self.timing.key_signatures;
        while self.key_index + 1 < changes.len() && downbeat >= changes[self.key_index + 1].time {
            self.key_index += 1;
        }
        changes
            .get(self.key_index)
            .map(|change| change.key)
            .unwrap_or_default()
    }

    fn encode_measure(&mut self, index: usize, (downbeat, window_end): (f64, f64)) -> Measure {
        let time = self.current_time_signature(downbeat);
        let key = self.current_key_signature(downbeat);
        let attributes: Attributes = write_attributes(key.fifths, time, self.clef);
        let divisions = time.divisions_per_measure();

        let grid = MeasureGrid {
            downbeat,
            next_downbeat: if self.timing.is_last(index) {
                None
            } else {
                Some(window_end)
            },
            length: window_end - downbeat,
            divisions,
        };

        let mut walk = MeasureWalk::new();
        if grid.length > 0.0 && grid.length.is_finite() {
            for note in self.notes {
                walk.place(note, &grid);
            }
        } else {
            log::warn!(
                "Measure {} has no length ({} to {}); writing a rest",
                index + 1,
                downbeat,
                window_end
            );
        }

        if !walk.sounded {
            walk.elements.push(MeasureElement::Note(build_rest(divisions)));
        }

        let measure = Measure {
            number: index + 1,
            attributes,
            divisions,
            elements: walk.elements,
        };

        log::debug!(
            "Measure {}: {}/{} key {} {} element(s), {} marker(s), {} voice(s)",
            measure.number,
            time.beats,
            time.beat_type,
            key.fifths,
            measure.elements.len(),
            measure.marker_count(),
            walk.max_voice
        );

        measure
    }
}

impl Iterator for MeasureEncoder<'_> {
    type Item = Measure;

    fn next(&mut self) -> Option<Measure> {
        let window = self.timing.window(self.index)?;
        let measure = self.encode_measure(self.index, window);
        self.index += 1;
        Some(measure)
    }
}

/// Maps times onto the divisions of one measure.
struct MeasureGrid {
    downbeat: f64,
    /// `None` for the last measure
    next_downbeat: Option<f64>,
    length: f64,
    divisions: u32,
}

impl MeasureGrid {
    fn scale(&self, span: f64) -> i64 {
        (span / self.length * self.divisions as f64).round_ties_even() as i64
    }

    /// Offset of `time` from this downbeat
    fn position(&self, time: f64) -> i64 {
        self.scale(time - self.downbeat)
    }

    /// Offset of `time` from the next downbeat, on this measure's scale
    fn position_from_next(&self, time: f64) -> Option<i64> {
        self.next_downbeat.map(|next| self.scale(time - next))
    }

    fn starts_before_next(&self, time: f64) -> bool {
        self.position_from_next(time).map_or(true, |offset| offset < 0)
    }

    fn ends_by_next(&self, time: f64) -> bool {
        self.position_from_next(time).map_or(true, |offset| offset <= 0)
    }

    fn placement(&self, note: &NoteEvent) -> Placement {
        let start = self.position(note.start);
        let measure_end = self.divisions as i64;

        if (0..measure_end).contains(&start) && self.starts_before_next(note.start) {
            let crosses = !self.ends_by_next(note.end);
            let duration = match self.next_downbeat {
                Some(next) if crosses => self.scale(next - note.start),
                _ => self.scale(note.end - note.start),
            };
            // Rounded separately from the offset, so it may overrun the barline
            return Placement::StartsHere {
                offset: start,
                duration: clamp_divisions(duration.min(measure_end - start)),
                crosses,
            };
        }

        let end = self.position(note.end);
        if start < 0 && end > 0 {
            let crosses = !self.ends_by_next(note.end);
            let duration = if crosses {
                self.divisions
            } else {
                clamp_divisions(end.min(measure_end))
            };
            return Placement::CarriedIn { duration, crosses };
        }

        Placement::Absent
    }
}

fn clamp_divisions(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Where a note sits relative to one measure
#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    StartsHere {
        offset: i64,
        duration: u32,
        crosses: bool,
    },
    CarriedIn {
        duration: u32,
        crosses: bool,
    },
    Absent,
}

/// Cursor, voice and output of one measure in progress
struct MeasureWalk {
    cursor: i64,
    voice: u32,
    max_voice: u32,
    sounded: bool,
    elements: Vec<MeasureElement>,
}

impl MeasureWalk {
    fn new() -> Self {
        Self {
            cursor: 0,
            voice: 1,
            max_voice: 1,
            sounded: false,
            elements: Vec::new(),
        }
    }

    fn place(&mut self, note: &NoteEvent, grid: &MeasureGrid) {
        let placement = grid.placement(note);
        log::trace!("{} [{}, {}): {:?}", note.pitch, note.start, note.end, placement);

        let (offset, duration, tie_in, tie_out) = match placement {
            Placement::StartsHere {
                offset,
                duration,
                crosses,
            } => (offset, duration, false, crosses),
            Placement::CarriedIn { duration, crosses } => (0, duration, true, crosses),
            Placement::Absent => return,
        };

        let compound = decompose(duration);
        if compound.is_empty() {
            log::trace!("{} rounds to nothing in this measure", note.pitch);
            return;
        }
        log::trace!(
            "{} written as {} ({} of {} divisions)",
            note.pitch,
            compound,
            compound.total_divisions(),
            duration
        );

        self.move_to(offset);
        self.sounded = true;
        self.elements.extend(
            build_note(note.pitch, duration, compound.symbols(), tie_in, tie_out, self.voice)
                .into_iter()
                .map(MeasureElement::Note),
        );
        self.cursor = offset + duration as i64;
    }

    /// Forward to a later offset (back to voice 1) or back up to an earlier
    /// one (next voice).
    fn move_to(&mut self, offset: i64) {
        if offset > self.cursor {
            self.elements.push(MeasureElement::Forward((offset - self.cursor) as u32));
            self.voice = 1;
        } else if offset < self.cursor {
            self.elements.push(MeasureElement::Backup((self.cursor - offset) as u32));
            self.next_voice();
        }
        self.cursor = offset;
    }

    fn next_voice(&mut self) {
        self.voice += 1;
        self.max_voice = self.max_voice.max(self.voice);
    }
}
