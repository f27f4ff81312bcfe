//! Splits a measure into its two staves and turns raw MusicXML notes into
//! engraving notes, folding chord tones into the note they sound with.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::model::{Measure, RawNote};
use super::duration::NoteDuration;
use super::plan::Clef;

/// The two staves of a grand staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Staff {
    Treble,
    Bass,
}

impl Staff {
    /// Map a MusicXML `<staff>` number. Anything but 1 or 2 has no staff.
    pub fn from_number(number: Option<i32>) -> Option<Self> {
        match number {
            Some(1) => Some(Staff::Treble),
            Some(2) => Some(Staff::Bass),
            _ => None,
        }
    }

    pub fn number(self) -> i32 {
        match self {
            Staff::Treble => 1,
            Staff::Bass => 2,
        }
    }

    pub fn clef(self) -> Clef {
        match self {
            Staff::Treble => Clef::Treble,
            Staff::Bass => Clef::Bass,
        }
    }

    /// Fixed line rests are engraved on, in place of MusicXML display-step logic.
    pub fn rest_key(self) -> &'static str {
        match self {
            Staff::Treble => "b/4",
            Staff::Bass => "b/2",
        }
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    #[default]
    Up,
    Down,
}

impl StemDirection {
    /// Pitched notes keep an explicit `up`/`down`; everything else stems up.
    pub fn resolve(note: &RawNote) -> Self {
        if note.pitch.is_none() || note.rest {
            return StemDirection::Up;
        }
        match note.stem.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("down") => StemDirection::Down,
            _ => StemDirection::Up,
        }
    }
}

/// A drawable note: one or more pitch keys (or a rest key) sharing a duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngravingNote {
    pub keys: Vec<String>,
    pub duration: NoteDuration,
    pub stem: StemDirection,
    pub clef: Clef,
    /// Cleared when the note is drawn under a beam.
    pub flag_visible: bool,
}

impl EngravingNote {
    pub fn is_rest(&self) -> bool {
        self.duration.is_rest()
    }
}

/// Raw notes of one measure, split per staff in source order.
#[derive(Debug, Default)]
pub struct StaffNotes<'a> {
    pub treble: Vec<&'a RawNote>,
    pub bass: Vec<&'a RawNote>,
}

/// Partition a measure's notes by staff tag. Untagged notes are dropped.
pub fn partition_staves(measure: &Measure) -> StaffNotes<'_> {
    let mut staves = StaffNotes::default();
    for note in &measure.notes {
        match Staff::from_number(note.staff) {
            Some(Staff::Treble) => staves.treble.push(note),
            Some(Staff::Bass) => staves.bass.push(note),
            None => debug!(
                "measure {}: dropping note with staff {:?}",
                measure.number, note.staff
            ),
        }
    }
    staves
}

/// Engrave both staves of a measure: `(treble, bass)`.
pub fn extract_measure(measure: &Measure) -> (Vec<EngravingNote>, Vec<EngravingNote>) {
    let staves = partition_staves(measure);
    (
        engrave_staff(Staff::Treble, &staves.treble),
        engrave_staff(Staff::Bass, &staves.bass),
    )
}

/// Turn one staff's raw notes into engraving notes.
///
/// Chord tones directly after a note are absorbed into it, one peek at a
/// time, so a chord of any size becomes a single note.
pub fn engrave_staff(staff: Staff, notes: &[&RawNote]) -> Vec<EngravingNote> {
    let mut engraved = Vec::with_capacity(notes.len());
    let mut iter = notes.iter().copied().peekable();

    while let Some(note) = iter.next() {
        if note.chord {
            debug!("staff {staff}: chord tone without a base note, dropped");
            continue;
        }

        let Some(base_key) = base_key(staff, note) else {
            let orphans = std::iter::from_fn(|| iter.next_if(|n| n.chord)).count();
            debug!("staff {staff}: note with neither pitch nor rest dropped ({orphans} chord tone(s) with it)");
            continue;
        };

        let mut keys = vec![base_key];
        while let Some(tone) = iter.next_if(|n| n.chord) {
            match &tone.pitch {
                Some(pitch) => keys.push(pitch.key()),
                None => debug!("staff {staff}: unpitched chord tone ignored"),
            }
        }

        engraved.push(EngravingNote {
            keys,
            duration: NoteDuration::resolve(note.note_type.as_deref(), note.rest, note.duration),
            stem: StemDirection::resolve(note),
            clef: staff.clef(),
            flag_visible: true,
        });
    }

    engraved
}

fn base_key(staff: Staff, note: &RawNote) -> Option<String> {
    if let Some(pitch) = &note.pitch {
        Some(pitch.key())
    } else if note.rest {
        Some(staff.rest_key().to_string())
    } else {
        None
    }
}
