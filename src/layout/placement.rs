//! Measure placement — where each measure's grand staff goes on the page,
//! when a new row starts, and which measures show clef and meter.

use log::trace;

use super::config::LayoutConfig;
use super::plan::{Clef, Separator, StaveGeometry, TimeSignature};

/// Running pen position across the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub row: usize,
    /// Measures already placed on the current row
    pub placed_in_row: usize,
}

impl Cursor {
    /// Top-left corner of the first row.
    pub fn start(config: &LayoutConfig) -> Self {
        Self {
            x: config.padding,
            y: config.padding,
            row: 0,
            placed_in_row: 0,
        }
    }
}

/// Clef and time signature shown at the start of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotations {
    pub clef: bool,
    pub time_signature: bool,
}

impl Annotations {
    /// The first measure shows clef and meter, later even-indexed measures
    /// repeat the clef, odd-indexed ones show nothing.
    pub fn for_index(measure_index: usize) -> Self {
        Self {
            clef: measure_index % 2 == 0,
            time_signature: measure_index == 0,
        }
    }

    fn stave(self, x: f64, y: f64, width: f64, clef: Clef) -> StaveGeometry {
        StaveGeometry {
            x,
            y,
            width,
            clef: self.clef.then_some(clef),
            time_signature: self.time_signature.then_some(TimeSignature::COMMON),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurePlacement {
    pub row: usize,
    /// Whether this measure moved the cursor to a new row
    pub wrapped: bool,
    pub separator: Separator,
    pub treble: StaveGeometry,
    pub bass: StaveGeometry,
}

/// Place measure `measure_index` at `cursor`, returning the placement and
/// the cursor for the next measure.
///
/// The separator is drawn at the incoming cursor, before any wrap. A row
/// always takes at least one measure, so a cursor past the right limit
/// wraps only when its row is non-empty.
pub fn place(config: &LayoutConfig, measure_index: usize, cursor: Cursor) -> (MeasurePlacement, Cursor) {
    let separator = Separator {
        x: cursor.x,
        y_top: cursor.y,
        y_bottom: cursor.y + config.row_height,
    };

    let wrapped = cursor.x > config.right_limit() && cursor.placed_in_row > 0;
    let origin = if wrapped {
        Cursor {
            x: config.padding,
            y: cursor.y + config.row_step(),
            row: cursor.row + 1,
            placed_in_row: 0,
        }
    } else {
        cursor
    };

    let annotations = Annotations::for_index(measure_index);
    let width = config.stave_width();
    let placement = MeasurePlacement {
        row: origin.row,
        wrapped,
        separator,
        treble: annotations.stave(origin.x, origin.y, width, Clef::Treble),
        bass: annotations.stave(origin.x, origin.y + config.row_height, width, Clef::Bass),
    };
    trace!(
        "measure {measure_index}: row {} at ({:.1}, {:.1}){}",
        origin.row,
        origin.x,
        origin.y,
        if wrapped { " after wrap" } else { "" }
    );

    let next = Cursor {
        x: origin.x + config.advance(),
        placed_in_row: origin.placed_in_row + 1,
        ..origin
    };
    (placement, next)
}
