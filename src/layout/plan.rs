//! Render plan — the renderer-agnostic output of the page layout.
//!
//! A plan lists, per measure, the geometry of both staves, the engraving
//! notes of each staff and the beam groups over them. An external engraving
//! backend consumes it either as data (serde) or through [`RenderPlan::replay`].

use serde::Serialize;

use super::beams::BeamGroup;
use super::extract::{EngravingNote, Staff};

// ═══════════════════════════════════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    Treble,
    Bass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    /// The only meter the layout displays.
    pub const COMMON: TimeSignature = TimeSignature { beats: 4, beat_type: 4 };
}

/// Vertical line drawn at a measure's starting cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Separator {
    pub x: f64,
    pub y_top: f64,
    pub y_bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaveGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub clef: Option<Clef>,
    pub time_signature: Option<TimeSignature>,
}

// ═══════════════════════════════════════════════════════════════════════
// Plan structures
// ═══════════════════════════════════════════════════════════════════════

/// Measured container the notes of one staff are formatted in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePlan {
    pub num_beats: u32,
    pub beat_value: u32,
    /// Non-strict voices accept note totals that do not fill the meter.
    pub strict: bool,
    pub target_width: f64,
}

impl VoicePlan {
    pub fn common_time(target_width: f64) -> Self {
        Self {
            num_beats: TimeSignature::COMMON.beats,
            beat_value: TimeSignature::COMMON.beat_type,
            strict: false,
            target_width,
        }
    }
}

/// One staff's notes for one measure, with the beams over them.
///
/// Beam groups hold indices into `notes`. Groups committed while walking
/// the measure are `inline_beams`; a run still open at the barline is
/// `tail_beam`. Both are drawn the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSequence {
    pub staff: Staff,
    pub notes: Vec<EngravingNote>,
    pub inline_beams: Vec<BeamGroup>,
    pub tail_beam: Option<BeamGroup>,
}

impl StaffSequence {
    /// All beam groups, inline ones first.
    pub fn beam_groups(&self) -> impl Iterator<Item = &BeamGroup> {
        self.inline_beams.iter().chain(self.tail_beam.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffPlan {
    pub stave: StaveGeometry,
    pub voice: VoicePlan,
    pub sequence: StaffSequence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurePlan {
    /// Position in the measure list (drives clef display)
    pub index: usize,
    /// Measure number from the source file
    pub number: i32,
    /// Zero-based system row
    pub row: usize,
    pub separator: Separator,
    pub treble: StaffPlan,
    pub bass: StaffPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub page: PageSize,
    pub rows: usize,
    pub measures: Vec<MeasurePlan>,
}

// ═══════════════════════════════════════════════════════════════════════
// Draw instructions
// ═══════════════════════════════════════════════════════════════════════

/// A single renderer call, borrowed from a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction<'a> {
    Separator(&'a Separator),
    Stave(&'a StaveGeometry),
    Voice {
        stave: &'a StaveGeometry,
        voice: &'a VoicePlan,
        notes: &'a [EngravingNote],
    },
    Beam(Vec<&'a EngravingNote>),
}

/// Drawing primitives an engraving renderer exposes.
pub trait EngravingBackend {
    fn resize(&mut self, _page: PageSize) {}
    fn draw_separator(&mut self, separator: &Separator);
    fn draw_stave(&mut self, stave: &StaveGeometry);
    fn draw_voice(&mut self, stave: &StaveGeometry, voice: &VoicePlan, notes: &[EngravingNote]);
    fn draw_beam(&mut self, notes: &[&EngravingNote]);
}

impl RenderPlan {
    /// Flatten the plan into renderer calls, in drawing order.
    ///
    /// Per measure: separator, both staves, both voices, the tail beams of
    /// both staves, then the inline beams of each staff.
    pub fn instructions(&self) -> Vec<DrawInstruction<'_>> {
        let mut out = Vec::new();
        for measure in &self.measures {
            let staves = [&measure.treble, &measure.bass];
            out.push(DrawInstruction::Separator(&measure.separator));
            out.extend(staves.map(|s| DrawInstruction::Stave(&s.stave)));
            out.extend(staves.map(|s| DrawInstruction::Voice {
                stave: &s.stave,
                voice: &s.voice,
                notes: &s.sequence.notes,
            }));
            for staff in staves {
                if let Some(tail) = &staff.sequence.tail_beam {
                    out.push(DrawInstruction::Beam(tail.resolve(&staff.sequence.notes)));
                }
            }
            for staff in staves {
                out.extend(
                    staff
                        .sequence
                        .inline_beams
                        .iter()
                        .map(|g| DrawInstruction::Beam(g.resolve(&staff.sequence.notes))),
                );
            }
        }
        out
    }

    /// Hand every instruction to `backend`, after sizing the page.
    pub fn replay<B: EngravingBackend + ?Sized>(&self, backend: &mut B) {
        backend.resize(self.page);
        for instruction in self.instructions() {
            match instruction {
                DrawInstruction::Separator(separator) => backend.draw_separator(separator),
                DrawInstruction::Stave(stave) => backend.draw_stave(stave),
                DrawInstruction::Voice { stave, voice, notes } => {
                    backend.draw_voice(stave, voice, notes)
                }
                DrawInstruction::Beam(notes) => backend.draw_beam(&notes),
            }
        }
    }

    /// Total number of beam groups across all measures and staves.
    pub fn beam_count(&self) -> usize {
        self.measures
            .iter()
            .flat_map(|m| [&m.treble, &m.bass])
            .map(|s| s.sequence.beam_groups().count())
            .sum()
    }
}
