use crate::geo::GeoPoint;

/// Axis-aligned box in degrees.
///
/// A box whose `min_lon > max_lon` crosses the antimeridian; it covers
/// `[min_lon, 180)` and `[-180, max_lon]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        GeoBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn straddles_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// Longitudinal extent in degrees, accounting for antimeridian wrap.
    pub fn width_deg(&self) -> f64 {
        if self.straddles_antimeridian() {
            self.max_lon + 360.0 - self.min_lon
        } else {
            self.max_lon - self.min_lon
        }
    }

    pub fn height_deg(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        let lat = p.latitude();
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }
        let lon = p.longitude();
        if self.straddles_antimeridian() {
            lon >= self.min_lon || lon <= self.max_lon
        } else {
            lon >= self.min_lon && lon <= self.max_lon
        }
    }
}
