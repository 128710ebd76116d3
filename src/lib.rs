pub mod attributes;
pub mod duration;
pub mod encoder;
pub mod error;
pub mod fragment;
pub mod musicxml;
pub mod pitch;
pub mod score;
pub mod timeline;

pub use attributes::{write_attributes, Attributes, Clef, KeySignature, Mode, TimeSignature};
pub use duration::{decompose, CompoundDuration, DurationSymbol, NoteType, DIVISIONS_PER_QUARTER};
pub use encoder::{encode, MeasureEncoder};
pub use error::*;
pub use fragment::{build_note, build_rest, Fragment};
pub use musicxml::to_musicxml;
pub use pitch::{Accidental, Pitch, Step};
pub use score::*;
pub use timeline::{NoteEvent, Performance, TimingMap, Track};

/// Encode every pitched track of a performance into a notation score.
///
/// Drum tracks are skipped; the remaining tracks become parts `P1`, `P2`, ...
/// in input order.
pub fn convert(performance: &Performance) -> Score {
    let timing = performance.timing();

    let parts = performance
        .tracks
        .iter()
        .filter(|track| !track.is_drum)
        .enumerate()
        .map(|(i, track)| {
            let id = format!("P{}", i + 1);
            log::info!(
                "Encoding part {} '{}' ({} notes, {} measures)",
                id,
                track.name,
                track.notes.len(),
                timing.measure_count()
            );
            Part {
                id,
                name: track.name.clone(),
                measures: encode(&track.notes, &timing),
            }
        })
        .collect();

    Score {
        metadata: performance.metadata.clone(),
        parts,
    }
}

/// Compile a YAML performance document to MusicXML.
/// This is the main entry point for the library.
pub fn compile(source: &str) -> Result<String, NotateError> {
    let performance = Performance::from_yaml(source)?;
    Ok(to_musicxml(&convert(&performance)))
}

/// Output file name for a MusicXML document: `.xml` is appended unless the
/// name already mentions a MusicXML extension.
pub fn musicxml_file_name(name: &str) -> String {
    if [".xml", ".mxl", ".musicxml"].iter().any(|ext| name.contains(ext)) {
        name.to_string()
    } else {
        format!("{}.xml", name)
    }
}
