//! Page layout configuration (all values in renderer user units).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

// ── Derived-geometry constants ──────────────────────────────────────
/// Fraction of the padding trimmed off the page width to get a stave's width.
const STAVE_PADDING_FACTOR: f64 = 1.1;
/// Space between a measure's voice area and its share of the stave.
const MEASURE_GUTTER: f64 = 40.0;

/// Fixed page geometry for the grand-staff layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_width: f64,
    /// Height of one stave row; a grand staff uses two.
    pub row_height: f64,
    pub padding: f64,
    pub measures_per_row: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 760.0,
            row_height: 100.0,
            padding: 50.0,
            measures_per_row: 2,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!("layout config: {config:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("pageWidth", self.page_width),
            ("rowHeight", self.row_height),
            ("padding", self.padding),
        ];
        if let Some((name, value)) = dims.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(ScoreError::InvalidConfig(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if self.measures_per_row == 0 {
            return Err(ScoreError::InvalidConfig(
                "measuresPerRow must be at least 1".to_string(),
            ));
        }
        if self.measure_width() <= 0.0 {
            return Err(ScoreError::InvalidConfig(format!(
                "pageWidth {} leaves no room for {} measures per row",
                self.page_width, self.measures_per_row
            )));
        }
        Ok(())
    }

    /// Width every stave is drawn with.
    pub fn stave_width(&self) -> f64 {
        self.page_width - STAVE_PADDING_FACTOR * self.padding
    }

    /// Width each measure's voices are formatted into.
    pub fn measure_width(&self) -> f64 {
        self.stave_width() / self.measures_per_row as f64 - MEASURE_GUTTER
    }

    /// Horizontal cursor step from one measure to the next.
    pub fn advance(&self) -> f64 {
        self.measure_width() + self.padding
    }

    /// A cursor past this x starts a new row.
    pub fn right_limit(&self) -> f64 {
        self.page_width - self.padding
    }

    /// Vertical step between rows (treble + bass).
    pub fn row_step(&self) -> f64 {
        self.row_height * 2.0
    }

    pub fn page_height(&self, rows: usize) -> f64 {
        rows as f64 * self.row_step() + self.padding
    }
}
