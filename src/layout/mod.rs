//! Page layout — converts a parsed Score into a render plan.
//!
//! Each measure becomes one grand-staff column: its notes are split per
//! staff, chord tones merged, beams grouped, and both staves placed on the
//! page. The resulting [`RenderPlan`] is rebuilt from scratch on every call
//! and holds everything an engraving backend needs to draw the page.

mod beams;
mod config;
mod duration;
mod extract;
mod placement;
mod plan;

use log::info;

use crate::model::{Measure, Score};

pub use beams::{group_beams, BeamGroup, BeamGroups};
pub use config::LayoutConfig;
pub use duration::{DurationCode, NoteDuration};
pub use extract::{
    engrave_staff, extract_measure, partition_staves, EngravingNote, Staff, StaffNotes,
    StemDirection,
};
pub use placement::{place, Annotations, Cursor, MeasurePlacement};
pub use plan::*;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Lay out the first part of `score` as a two-staff page.
pub fn layout_score(score: &Score, config: &LayoutConfig) -> RenderPlan {
    layout_measures(score.layout_measures(), config)
}

/// Lay out a measure list. An empty list yields a plan with no rows.
pub fn layout_measures(measures: &[Measure], config: &LayoutConfig) -> RenderPlan {
    let mut cursor = Cursor::start(config);
    let mut plans = Vec::with_capacity(measures.len());

    for (index, measure) in measures.iter().enumerate() {
        let (placement, next) = place(config, index, cursor);
        cursor = next;
        plans.push(plan_measure(index, measure, placement, config));
    }

    let rows = plans.last().map_or(0, |m| m.row + 1);
    let page = PageSize {
        width: config.page_width,
        height: config.page_height(rows),
    };
    info!(
        "laid out {} measure(s) in {} row(s), page {}x{}",
        plans.len(),
        rows,
        page.width,
        page.height
    );

    RenderPlan {
        page,
        rows,
        measures: plans,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Per-measure assembly
// ═══════════════════════════════════════════════════════════════════════

fn plan_measure(
    index: usize,
    measure: &Measure,
    placement: MeasurePlacement,
    config: &LayoutConfig,
) -> MeasurePlan {
    let (treble_notes, bass_notes) = extract_measure(measure);
    MeasurePlan {
        index,
        number: measure.number,
        row: placement.row,
        separator: placement.separator,
        treble: plan_staff(Staff::Treble, placement.treble, treble_notes, config),
        bass: plan_staff(Staff::Bass, placement.bass, bass_notes, config),
    }
}

fn plan_staff(
    staff: Staff,
    stave: StaveGeometry,
    mut notes: Vec<EngravingNote>,
    config: &LayoutConfig,
) -> StaffPlan {
    let beams = group_beams(&mut notes);
    StaffPlan {
        stave,
        voice: VoicePlan::common_time(config.measure_width()),
        sequence: StaffSequence {
            staff,
            notes,
            inline_beams: beams.inline,
            tail_beam: beams.tail,
        },
    }
}
