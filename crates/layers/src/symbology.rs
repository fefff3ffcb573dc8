//! Score-to-color symbology for heatmap tiles.
//!
//! Band thresholds are inclusive lower bounds: 0.3, 0.5, 0.7 and 0.9 each
//! belong to the band above them.

pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];
pub const ORANGE: [f32; 3] = [1.0, 0.647, 0.0];
pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const DARK_RED: [f32; 3] = [0.545, 0.0, 0.0];
pub const CYAN: [f32; 3] = [0.0, 1.0, 1.0];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillStyle {
    pub color: [f32; 3],
    pub opacity: f32,
}

impl FillStyle {
    pub const fn new(color: [f32; 3], opacity: f32) -> Self {
        Self { color, opacity }
    }

    pub fn rgba(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }
}

/// One of five discrete classes a tile score maps into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoreBand {
    Lowest = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Highest = 5,
}

impl ScoreBand {
    /// `None` when the score is not a number.
    pub fn for_score(score: f64) -> Option<Self> {
        let s = clamp_score(score)?;
        Some(if s >= 0.9 {
            ScoreBand::Highest
        } else if s >= 0.7 {
            ScoreBand::High
        } else if s >= 0.5 {
            ScoreBand::Medium
        } else if s >= 0.3 {
            ScoreBand::Low
        } else {
            ScoreBand::Lowest
        })
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn style(self) -> FillStyle {
        match self {
            ScoreBand::Highest => FillStyle::new(WHITE, 0.6),
            ScoreBand::High => FillStyle::new(YELLOW, 0.6),
            ScoreBand::Medium => FillStyle::new(ORANGE, 0.6),
            ScoreBand::Low => FillStyle::new(RED, 0.6),
            ScoreBand::Lowest => FillStyle::new(DARK_RED, 0.5),
        }
    }
}

/// Clamps a score into `[0, 1]`; `None` for NaN.
pub fn clamp_score(score: f64) -> Option<f64> {
    if score.is_nan() {
        return None;
    }
    Some(score.clamp(0.0, 1.0))
}
