use crate::bounds::GeoBox;
use crate::geo::{GeoPoint, bounding_box_degrees, km_to_degrees};

/// Default angular width of a scored tile footprint.
pub const DEFAULT_TILE_WIDTH_DEG: f64 = 0.022;

/// A user-selected square area: a center and a side length in kilometers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Region {
    pub center: GeoPoint,
    pub side_length_km: f64,
}

impl Region {
    pub fn new(center: GeoPoint, side_length_km: f64) -> Self {
        Self {
            center,
            side_length_km,
        }
    }

    /// Half-width of the preview box. The side length is applied on each side
    /// of the center, matching how the scoring backend lays out its tile grid.
    pub fn half_width_deg(&self) -> f64 {
        km_to_degrees(self.side_length_km)
    }

    pub fn bounds(&self) -> GeoBox {
        bounding_box_degrees(self.center, self.half_width_deg())
    }
}

/// One scored square of a completed job.
///
/// `score` is NaN when the backend sent something non-numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTile {
    pub id: String,
    pub center: GeoPoint,
    pub width_deg: f64,
    pub score: f64,
}

impl ScoredTile {
    pub fn new(id: impl Into<String>, center: GeoPoint, score: f64) -> Self {
        Self {
            id: id.into(),
            center,
            width_deg: DEFAULT_TILE_WIDTH_DEG,
            score,
        }
    }

    pub fn with_width(mut self, width_deg: f64) -> Self {
        self.width_deg = width_deg;
        self
    }

    pub fn footprint(&self) -> GeoBox {
        bounding_box_degrees(self.center, self.width_deg / 2.0)
    }
}
