//! Integration tests for the notate converter
//!
//! Tests the full pipeline from a YAML performance to MusicXML output, reading
//! the output back to check measure contents.

use notate::{compile, NotateError};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A note, rest, forward or backup as read back from the document
#[derive(Debug, Default, Clone)]
struct Item {
    kind: String,
    duration: u32,
    ties: Vec<String>,
    voice: Option<u32>,
    note_type: Option<String>,
    step: Option<String>,
}

/// Parts, each a list of measures, each a list of items
fn read_measures(xml: &str) -> Vec<Vec<Vec<Item>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut parts: Vec<Vec<Vec<Item>>> = Vec::new();
    let mut current: Option<Item> = None;
    let mut text_tag: Option<String> = None;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => match e.name().as_ref() {
                b"part" => parts.push(Vec::new()),
                b"measure" => parts.last_mut().unwrap().push(Vec::new()),
                kind @ (b"note" | b"forward" | b"backup") => {
                    current = Some(Item {
                        kind: String::from_utf8(kind.to_vec()).unwrap(),
                        ..Item::default()
                    })
                }
                name => text_tag = Some(String::from_utf8(name.to_vec()).unwrap()),
            },
            Event::Empty(e) => {
                if let Some(item) = current.as_mut() {
                    match e.name().as_ref() {
                        b"rest" => item.kind = "rest".to_string(),
                        b"tie" => {
                            let attr = e.try_get_attribute("type").unwrap().unwrap();
                            item.ties.push(String::from_utf8(attr.value.to_vec()).unwrap());
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(item), Some(tag)) = (current.as_mut(), text_tag.as_deref()) {
                    let text = t.unescape().unwrap().to_string();
                    match tag {
                        "duration" => item.duration = text.parse().unwrap(),
                        "voice" => item.voice = Some(text.parse().unwrap()),
                        "type" => item.note_type = Some(text),
                        "step" => item.step = Some(text),
                        _ => {}
                    }
                }
            }
            Event::End(e) => {
                if matches!(e.name().as_ref(), b"note" | b"forward" | b"backup") {
                    let item = current.take().unwrap();
                    parts.last_mut().unwrap().last_mut().unwrap().push(item);
                }
                text_tag = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parts
}

fn is_marker(item: &Item) -> bool {
    item.kind == "forward" || item.kind == "backup"
}

#[test]
fn test_single_note_fills_measure() {
    let source = r#"
downbeats: [0.0]
end-time: 2.0
time-signatures:
  - { time: 0.0, numerator: 4, denominator: 4 }
key-signatures:
  - { time: 0.0, key-number: 0 }
tracks:
  - name: Violin
    notes:
      - { start: 0.0, end: 2.0, pitch: A4 }
"#;
    let xml = compile(source).unwrap();
    let parts = read_measures(&xml);
    let measure = &parts[0][0];

    assert_eq!(measure.iter().filter(|i| is_marker(i)).count(), 0);
    assert_eq!(measure.len(), 1);
    assert_eq!(measure[0].kind, "note");
    assert_eq!(measure[0].voice, Some(1));
    assert_eq!(measure[0].duration, 96);
    assert_eq!(measure[0].note_type.as_deref(), Some("whole"));
    assert!(measure[0].ties.is_empty());
}

#[test]
fn test_silent_measures_rest_for_their_length() {
    let source = r#"
downbeats: [0.0, 1.5, 3.0]
end-time: 4.5
time-signatures:
  - { time: 0.0, numerator: 3, denominator: 4 }
  - { time: 1.5, numerator: 6, denominator: 8 }
  - { time: 3.0, numerator: 5, denominator: 4 }
tracks:
  - name: Oboe
    notes: []
"#;
    let xml = compile(source).unwrap();
    let measures = &read_measures(&xml)[0];

    assert_eq!(measures.len(), 3);
    for (measure, expected) in measures.iter().zip([72, 72, 120]) {
        assert_eq!(measure.len(), 1);
        assert_eq!(measure[0].kind, "rest");
        assert_eq!(measure[0].duration, expected);
    }
    assert_eq!(measures[0][0].note_type.as_deref(), Some("half"));
    // 5/4 has no single symbol and is written as a whole-measure rest
    assert!(xml.contains("<rest measure=\"yes\"/>"));
}

#[test]
fn test_note_over_barline_is_tied_without_gap() {
    let source = r#"
downbeats: [0.0, 2.0]
end-time: 4.0
time-signatures:
  - { time: 0.0, numerator: 4, denominator: 4 }
tracks:
  - name: Horn
    notes:
      - { start: 0.5, end: 3.5, pitch: F4 }
"#;
    let xml = compile(source).unwrap();
    let measures = &read_measures(&xml)[0];

    let first = &measures[0];
    assert_eq!(first[0].kind, "forward");
    assert_eq!(first[0].duration, 24);
    let tail = first.last().unwrap();
    assert_eq!(tail.ties, vec!["start"]);

    let second = &measures[1];
    let head = &second[0];
    assert_eq!(head.ties, vec!["stop"]);

    let before: u32 = first.iter().filter(|i| i.kind == "note").map(|i| i.duration).sum();
    let after: u32 = second.iter().filter(|i| i.kind == "note").map(|i| i.duration).sum();
    assert_eq!(24 + before, 96, "first half ends on the barline");
    assert_eq!(before + after, 144, "tied halves add up to the whole note");
}

#[test]
fn test_chord_uses_backup_and_second_voice() {
    let source = r#"
downbeats: [0.0]
end-time: 2.0
tracks:
  - name: Piano
    notes:
      - { start: 0.0, end: 1.0, pitch: C4 }
      - { start: 0.0, end: 1.0, pitch: E4 }
      - { start: 0.0, end: 1.0, pitch: G4 }
      - { start: 1.0, end: 2.0, pitch: C5 }
"#;
    let xml = compile(source).unwrap();
    let measure = &read_measures(&xml)[0][0];
    let kinds: Vec<&str> = measure.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec!["note", "backup", "note", "backup", "note", "note"]
    );
    let voices: Vec<u32> = measure.iter().filter_map(|i| i.voice).collect();
    assert_eq!(voices, vec![1, 2, 3, 3]);
}

#[test]
fn test_cursor_never_goes_negative() {
    let source = r#"
downbeats: [0.0, 2.0, 4.0]
end-time: 6.0
tracks:
  - name: Guitar
    notes:
      - { start: 0.0, end: 0.75, pitch: E3 }
      - { start: 0.25, end: 2.5, pitch: B3 }
      - { start: 1.0, end: 1.5, pitch: G3 }
      - { start: 1.9, end: 5.0, pitch: D4 }
      - { start: 3.0, end: 3.25, pitch: A3 }
      - { start: 4.5, end: 6.0, pitch: E4 }
"#;
    let xml = compile(source).unwrap();
    for measure in &read_measures(&xml)[0] {
        let mut cursor: i64 = 0;
        for item in measure {
            match item.kind.as_str() {
                "backup" => cursor -= item.duration as i64,
                _ => cursor += item.duration as i64,
            }
            assert!(cursor >= 0);
            assert!(cursor <= 96);
        }
    }
}

#[test]
fn test_parts_and_drums() {
    let source = r#"
metadata:
  title: Trio
downbeats: [0.0]
end-time: 2.0
tracks:
  - name: Flute
    notes:
      - { start: 0.0, end: 2.0, pitch: 72 }
  - name: Kit
    is-drum: true
    notes:
      - { start: 0.0, end: 0.1, pitch: 36 }
  - name: Bass
    notes:
      - { start: 0.0, end: 2.0, pitch: E2 }
"#;
    let xml = compile(source).unwrap();
    assert!(xml.contains("<work-title>Trio</work-title>"));
    assert!(xml.contains("<score-part id=\"P1\">"));
    assert!(xml.contains("<part-name>Flute</part-name>"));
    assert!(xml.contains("<part id=\"P2\">"));
    assert!(xml.contains("<part-name>Bass</part-name>"));
    assert!(!xml.contains("Kit"));

    let parts = read_measures(&xml);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0][0][0].step.as_deref(), Some("C"));
    // Bass part votes for the bass clef
    assert!(xml.contains("<sign>F</sign>"));
}

#[test]
fn test_key_changes_and_altered_pitches() {
    let source = r#"
downbeats: [0.0, 2.0]
end-time: 4.0
key-signatures:
  - { time: 0.0, key-number: 2 }
  - { time: 2.0, key-number: 12 }
tracks:
  - name: Clarinet
    notes:
      - { start: 0.0, end: 2.0, pitch: F#4 }
      - { start: 2.0, end: 4.0, pitch: Eb4 }
"#;
    let xml = compile(source).unwrap();
    assert!(xml.contains("<fifths>2</fifths>"));
    assert!(xml.contains("<fifths>-3</fifths>"));
    assert!(xml.contains("<alter>1</alter>"));
    assert!(xml.contains("<alter>-1</alter>"));
}

#[test]
fn test_malformed_pitch_fails() {
    let source = r#"
downbeats: [0.0]
tracks:
  - notes:
      - { start: 0.0, end: 1.0, pitch: X9 }
"#;
    assert!(matches!(compile(source), Err(NotateError::InputError(_))));
}

#[test]
fn test_no_downbeats_gives_empty_parts() {
    let source = r#"
tracks:
  - name: Solo
    notes:
      - { start: 0.0, end: 1.0, pitch: C4 }
"#;
    let xml = compile(source).unwrap();
    let parts = read_measures(&xml);
    assert_eq!(parts.len(), 1);
    assert!(parts[0].is_empty());
}
