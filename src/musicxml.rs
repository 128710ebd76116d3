use quick_xml::escape::escape;

use crate::attributes::Attributes;
use crate::fragment::Fragment;
use crate::score::*;

/// Convert a Score to MusicXML format
pub fn to_musicxml(score: &Score) -> String {
    let mut xml = String::new();

    // XML declaration and doctype
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');

    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    if let Some(title) = &score.metadata.title {
        xml.push_str("  <work>\n");
        xml.push_str(&format!("    <work-title>{}</work-title>\n", escape(title)));
        xml.push_str("  </work>\n");
    }

    if let Some(composer) = &score.metadata.composer {
        xml.push_str("  <identification>\n");
        xml.push_str(&format!(
            "    <creator type=\"composer\">{}</creator>\n",
            escape(composer)
        ));
        xml.push_str("  </identification>\n");
    }

    xml.push_str("  <part-list>\n");
    for part in &score.parts {
        xml.push_str(&format!("    <score-part id=\"{}\">\n", escape(&part.id)));
        xml.push_str(&format!("      <part-name>{}</part-name>\n", escape(&part.name)));
        xml.push_str("    </score-part>\n");
    }
    xml.push_str("  </part-list>\n");

    for part in &score.parts {
        xml.push_str(&format!("  <part id=\"{}\">\n", escape(&part.id)));
        for measure in &part.measures {
            xml.push_str(&measure_to_xml(measure));
        }
        xml.push_str("  </part>\n");
    }

    xml.push_str("</score-partwise>\n");

    xml
}

fn measure_to_xml(measure: &Measure) -> String {
    let mut xml = String::new();

    xml.push_str(&format!("    <measure number=\"{}\">\n", measure.number));
    xml.push_str(&attributes_to_xml(&measure.attributes));

    for element in &measure.elements {
        xml.push_str(&element_to_xml(element));
    }

    xml.push_str("    </measure>\n");
    xml
}

fn attributes_to_xml(attributes: &Attributes) -> String {
    let mut xml = String::new();

    xml.push_str("      <attributes>\n");
    xml.push_str(&format!("        <divisions>{}</divisions>\n", attributes.divisions));
    xml.push_str("        <key>\n");
    xml.push_str(&format!("          <fifths>{}</fifths>\n", attributes.fifths));
    xml.push_str("        </key>\n");
    xml.push_str("        <time>\n");
    xml.push_str(&format!("          <beats>{}</beats>\n", attributes.time.beats));
    xml.push_str(&format!(
        "          <beat-type>{}</beat-type>\n",
        attributes.time.beat_type
    ));
    xml.push_str("        </time>\n");
    xml.push_str("        <clef>\n");
    xml.push_str(&format!("          <sign>{}</sign>\n", attributes.clef.sign()));
    xml.push_str(&format!("          <line>{}</line>\n", attributes.clef.line()));
    xml.push_str("        </clef>\n");
    xml.push_str("      </attributes>\n");

    xml
}

fn element_to_xml(element: &MeasureElement) -> String {
    match element {
        MeasureElement::Forward(duration) => cursor_marker_to_xml("forward", *duration),
        MeasureElement::Backup(duration) => cursor_marker_to_xml("backup", *duration),
        MeasureElement::Note(fragment) if fragment.is_rest() => rest_to_xml(fragment),
        MeasureElement::Note(fragment) => note_to_xml(fragment),
    }
}

fn cursor_marker_to_xml(tag: &str, duration: u32) -> String {
    format!(
        "      <{tag}>\n        <duration>{duration}</duration>\n      </{tag}>\n"
    )
}

fn note_to_xml(fragment: &Fragment) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");

    if let Some(pitch) = &fragment.pitch {
        xml.push_str("        <pitch>\n");
        xml.push_str(&format!("          <step>{}</step>\n", pitch.step.as_str()));
        if let Some(alter) = pitch.accidental.alter() {
            xml.push_str(&format!("          <alter>{}</alter>\n", alter));
        }
        xml.push_str(&format!("          <octave>{}</octave>\n", pitch.octave));
        xml.push_str("        </pitch>\n");
    }

    xml.push_str(&format!("        <duration>{}</duration>\n", fragment.duration));

    // Ties (for playback - must come before <voice>)
    if fragment.tie_stop {
        xml.push_str("        <tie type=\"stop\"/>\n");
    }
    if fragment.tie_start {
        xml.push_str("        <tie type=\"start\"/>\n");
    }

    xml.push_str(&format!("        <voice>{}</voice>\n", fragment.voice));
    xml.push_str(&type_and_dots_to_xml(fragment));

    // Tied notations (for display)
    if fragment.tie_stop || fragment.tie_start {
        xml.push_str("        <notations>\n");
        if fragment.tie_stop {
            xml.push_str("          <tied type=\"stop\"/>\n");
        }
        if fragment.tie_start {
            xml.push_str("          <tied type=\"start\"/>\n");
        }
        xml.push_str("        </notations>\n");
    }

    xml.push_str("      </note>\n");
    xml
}

fn rest_to_xml(fragment: &Fragment) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");
    // A rest without a single symbol fills the measure
    if fragment.symbol.is_some() {
        xml.push_str("        <rest/>\n");
    } else {
        xml.push_str("        <rest measure=\"yes\"/>\n");
    }
    xml.push_str(&format!("        <duration>{}</duration>\n", fragment.duration));
    xml.push_str(&type_and_dots_to_xml(fragment));
    xml.push_str("      </note>\n");

    xml
}

fn type_and_dots_to_xml(fragment: &Fragment) -> String {
    let mut xml = String::new();
    if let Some(symbol) = fragment.symbol {
        xml.push_str(&format!("        <type>{}</type>\n", symbol.base.musicxml_type()));
        for _ in 0..symbol.dots {
            xml.push_str("        <dot/>\n");
        }
    }
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{write_attributes, Clef, TimeSignature};
    use crate::duration::decompose;
    use crate::fragment::{build_note, build_rest};

    fn measure(elements: Vec<MeasureElement>) -> Measure {
        Measure {
            number: 1,
            attributes: write_attributes(-3, TimeSignature::default(), Clef::Bass),
            divisions: 96,
            elements,
        }
    }

    fn score_with(measures: Vec<Measure>) -> Score {
        Score {
            metadata: Metadata::default(),
            parts: vec![Part {
                id: "P1".to_string(),
                name: "Cello".to_string(),
                measures,
            }],
        }
    }

    #[test]
    fn test_basic_musicxml_output() {
        let pitch = "C#3".parse().unwrap();
        let notes = build_note(pitch, 96, decompose(96).symbols(), false, false, 1);
        let xml = to_musicxml(&score_with(vec![measure(
            notes.into_iter().map(MeasureElement::Note).collect(),
        )]));

        assert!(xml.contains("<score-partwise"));
        assert!(xml.contains("<score-part id=\"P1\">"));
        assert!(xml.contains("<part-name>Cello</part-name>"));
        assert!(xml.contains("<divisions>24</divisions>"));
        assert!(xml.contains("<fifths>-3</fifths>"));
        assert!(xml.contains("<sign>F</sign>"));
        assert!(xml.contains("<line>4</line>"));
        assert!(xml.contains("<step>C</step>"));
        assert!(xml.contains("<alter>1</alter>"));
        assert!(xml.contains("<octave>3</octave>"));
        assert!(xml.contains("<type>whole</type>"));
        assert!(!xml.contains("<tie"));
    }

    #[test]
    fn test_musicxml_with_metadata() {
        let mut score = score_with(vec![]);
        score.metadata.title = Some("Fish & Chips".to_string());
        score.metadata.composer = Some("Me".to_string());
        let xml = to_musicxml(&score);
        assert!(xml.contains("<work-title>Fish &amp; Chips</work-title>"));
        assert!(xml.contains("<creator type=\"composer\">Me</creator>"));
    }

    #[test]
    fn test_musicxml_tie_and_dots_output() {
        let pitch = "E4".parse().unwrap();
        let notes = build_note(pitch, 60, decompose(60).symbols(), false, true, 2);
        let xml = to_musicxml(&score_with(vec![measure(
            notes.into_iter().map(MeasureElement::Note).collect(),
        )]));

        // half (start) then eighth (stop, start)
        assert_eq!(xml.matches("<tie type=\"start\"/>").count(), 2);
        assert_eq!(xml.matches("<tie type=\"stop\"/>").count(), 1);
        assert_eq!(xml.matches("<tied type=\"start\"/>").count(), 2);
        assert!(xml.contains("<voice>2</voice>"));

        let dotted = build_note(pitch, 36, decompose(36).symbols(), false, false, 1);
        let xml = to_musicxml(&score_with(vec![measure(
            dotted.into_iter().map(MeasureElement::Note).collect(),
        )]));
        assert!(xml.contains("<type>quarter</type>"));
        assert_eq!(xml.matches("<dot/>").count(), 1);
    }

    #[test]
    fn test_markers_and_rests() {
        let xml = to_musicxml(&score_with(vec![measure(vec![
            MeasureElement::Forward(24),
            MeasureElement::Backup(12),
            MeasureElement::Note(build_rest(72)),
            MeasureElement::Note(build_rest(120)),
        ])]));
        assert!(xml.contains("<forward>\n        <duration>24</duration>\n      </forward>"));
        assert!(xml.contains("<backup>\n        <duration>12</duration>\n      </backup>"));
        assert!(xml.contains("<rest/>"));
        assert!(xml.contains("<type>half</type>"));
        assert!(xml.contains("<rest measure=\"yes\"/>"));
        assert!(xml.contains("<duration>120</duration>"));
        // Rests carry no pitch or voice
        assert!(!xml.contains("<voice>"));
    }
}
