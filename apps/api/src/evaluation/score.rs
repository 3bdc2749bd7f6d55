//! Score-to-band mapping for the result badge.

use serde::Serialize;

/// Badge band for a GEO score. Total over all integers — out-of-range
/// scores fall into the nearest band rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Amber,
    Red,
}

impl ScoreBand {
    /// ≥80 green, 50–79 amber, <50 red.
    pub fn for_score(score: i64) -> Self {
        if score >= 80 {
            ScoreBand::Green
        } else if score >= 50 {
            ScoreBand::Amber
        } else {
            ScoreBand::Red
        }
    }

    /// Badge color used by the renderer.
    pub fn css_color(self) -> &'static str {
        match self {
            ScoreBand::Green => "#1a7f37",
            ScoreBand::Amber => "#d97706",
            ScoreBand::Red => "#dc2626",
        }
    }
}
