//! Data model for a parsed MusicXML score.
//!
//! Only the fields the grand-staff layout reads are captured. Everything
//! here is produced once by the parser and treated as read-only input.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece (`work-title`, falling back to `movement-title`)
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Musical parts (instruments)
    pub parts: Vec<Part>,
}

/// A musical part. For a piano score this holds both staves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name from the part-list (e.g., "Piano")
    pub name: String,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number as written in the file
    pub number: i32,
    /// Notes and rests in source order, both staves interleaved
    pub notes: Vec<RawNote>,
}

/// One `<note>` entry as it appears in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNote {
    /// Pitch (None for rests and malformed entries)
    pub pitch: Option<Pitch>,
    /// Whether this is a rest
    pub rest: bool,
    /// Whether this tone sounds together with the previous note
    pub chord: bool,
    /// Duration in divisions; only consulted for rests
    pub duration: Option<i32>,
    /// Note type: "whole", "half", "quarter", "eighth", "16th", "32nd", "64th"
    pub note_type: Option<String>,
    /// Stem direction: "up" or "down"
    pub stem: Option<String>,
    /// Staff number (1 = treble, 2 = bass)
    pub staff: Option<i32>,
}

/// Pitch of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A, B, C, D, E, F, G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// The measures the page layout walks: those of the first part.
    pub fn layout_measures(&self) -> &[Measure] {
        self.parts
            .first()
            .map(|p| p.measures.as_slice())
            .unwrap_or_default()
    }

    /// Number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.layout_measures().len()
    }
}

impl Pitch {
    /// Engraving key, e.g. `c/4` for middle C.
    pub fn key(&self) -> String {
        format!("{}/{}", self.step.to_lowercase(), self.octave)
    }
}
