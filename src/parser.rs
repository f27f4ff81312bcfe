//! MusicXML parser — converts MusicXML XML into the Score data model.

use log::debug;
use roxmltree::{Document, Node};

use crate::error::{Result, ScoreError};
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(ScoreError::UnsupportedFormat(
            root.tag_name().name().to_string(),
        ));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "movement-title" => {
                if score.title.is_none() {
                    score.title = text_of(&child);
                }
            }
            "identification" => parse_identification(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score),
            _ => {}
        }
    }

    debug!(
        "parsed score: {} part(s), {} measure(s) in first part",
        score.parts.len(),
        score.measure_count()
    );
    Ok(score)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "work-title" {
            // work-title wins over movement-title
            score.title = text_of(&child).or(score.title.take());
        }
    }
}

// ─── Identification ──────────────────────────────────────────────────

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "creator" && child.attribute("type") == Some("composer") {
            score.composer = text_of(&child);
        }
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "score-part" {
            let mut part = Part {
                id: child.attribute("id").unwrap_or("").to_string(),
                ..Part::default()
            };
            if let Some(name) = child
                .children()
                .find(|n| n.is_element() && n.tag_name().name() == "part-name")
            {
                part.name = text_of(&name).unwrap_or_default();
            }
            score.parts.push(part);
        }
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) {
    let part_id = node.attribute("id").unwrap_or("").to_string();

    // A part missing from the part-list still carries music; keep it.
    let idx = match score.parts.iter().position(|p| p.id == part_id) {
        Some(idx) => idx,
        None => {
            debug!("part '{part_id}' not declared in part-list");
            score.parts.push(Part {
                id: part_id,
                ..Part::default()
            });
            score.parts.len() - 1
        }
    };

    let part = &mut score.parts[idx];
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            part.measures.push(parse_measure(&child));
        }
    }
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node) -> Measure {
    let number = node
        .attribute("number")
        .and_then(|n| n.trim().parse::<i32>().ok())
        .unwrap_or(0);

    let notes = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "note")
        .map(|n| parse_note(&n))
        .collect();

    Measure { number, notes }
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node) -> RawNote {
    let mut note = RawNote::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = parse_pitch(&child),
            "rest" => note.rest = true,
            "chord" => note.chord = true,
            "duration" => note.duration = parse_i32(&child),
            "type" => note.note_type = text_of(&child),
            "stem" => note.stem = text_of(&child),
            "staff" => note.staff = parse_i32(&child),
            _ => {}
        }
    }

    note
}

/// A pitch needs both a step and an octave to produce an engraving key.
fn parse_pitch(node: &Node) -> Option<Pitch> {
    let mut step = None;
    let mut octave = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => step = text_of(&child),
            "octave" => octave = parse_i32(&child),
            _ => {}
        }
    }
    match (step, octave) {
        (Some(step), Some(octave)) => Some(Pitch { step, octave }),
        _ => {
            debug!("ignoring incomplete <pitch>");
            None
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn text_of(node: &Node) -> Option<String> {
    node.text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <work><work-title>Little Study</work-title></work>
  <identification><creator type="composer">Anon.</creator></identification>
  <part-list><score-part id="P1"><part-name>Piano</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <note><pitch><step>C</step><octave>5</octave></pitch><duration>1</duration><type>eighth</type><stem>down</stem><staff>1</staff></note>
      <note><chord/><pitch><step>E</step><octave>5</octave></pitch><duration>1</duration><type>eighth</type><stem>down</stem><staff>1</staff></note>
      <note><rest/><duration>2</duration><type>quarter</type><staff>2</staff></note>
    </measure>
    <measure number="2"/>
  </part>
</score-partwise>"#;

    #[test]
    fn parses_metadata_and_notes() {
        let score = parse_musicxml(MINIMAL).unwrap();
        assert_eq!(score.version.as_deref(), Some("3.1"));
        assert_eq!(score.title.as_deref(), Some("Little Study"));
        assert_eq!(score.composer.as_deref(), Some("Anon."));
        assert_eq!(score.parts.len(), 1);
        assert_eq!(score.parts[0].name, "Piano");

        let m1 = &score.layout_measures()[0];
        assert_eq!(m1.number, 1);
        assert_eq!(m1.notes.len(), 3);

        let first = &m1.notes[0];
        assert_eq!(first.pitch.as_ref().unwrap().key(), "c/5");
        assert_eq!(first.note_type.as_deref(), Some("eighth"));
        assert_eq!(first.stem.as_deref(), Some("down"));
        assert_eq!(first.staff, Some(1));
        assert!(!first.chord);

        assert!(m1.notes[1].chord);

        let rest = &m1.notes[2];
        assert!(rest.rest);
        assert!(rest.pitch.is_none());
        assert_eq!(rest.duration, Some(2));
        assert_eq!(rest.staff, Some(2));
    }

    #[test]
    fn measure_without_notes_is_empty() {
        let score = parse_musicxml(MINIMAL).unwrap();
        let m2 = &score.layout_measures()[1];
        assert_eq!(m2.number, 2);
        assert!(m2.notes.is_empty());
    }

    #[test]
    fn rejects_timewise_documents() {
        let err = parse_musicxml("<score-timewise/>").unwrap_err();
        assert!(matches!(err, ScoreError::UnsupportedFormat(ref root) if root == "score-timewise"));
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(
            parse_musicxml("<score-partwise>"),
            Err(ScoreError::Xml(_))
        ));
    }

    #[test]
    fn movement_title_is_a_fallback() {
        let xml = r#"<score-partwise><movement-title>Prelude</movement-title></score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.title.as_deref(), Some("Prelude"));
        assert_eq!(score.measure_count(), 0);
    }
}
