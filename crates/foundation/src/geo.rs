//! Geographic primitives in degrees.
//!
//! Conventions:
//! - Latitude is clamped to `[-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG]` wherever a
//!   rectangle is derived from it, so poles never produce degenerate footprints.
//! - Longitude is normalized into `[-180, 180)`.
//! - Boxes are built coordinate by coordinate; a box may straddle the
//!   antimeridian (`min_lon > max_lon`) and callers must tolerate that.

use crate::bounds::GeoBox;

/// Latitude limit used for rectangle math.
pub const MAX_LATITUDE_DEG: f64 = 89.9;

/// Approximate kilometers per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

pub fn clamp_latitude(v: f64) -> f64 {
    v.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG)
}

/// Maps `v` into `[-180, 180)` with modular wraparound.
pub fn normalize_longitude(v: f64) -> f64 {
    let wrapped = (v + 180.0).rem_euclid(360.0) - 180.0;
    // `rem_euclid` may round up to exactly 360 for inputs just below a multiple.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Equatorial approximation of a ground distance in degrees.
pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Square box of `half_width_deg` around `center`.
pub fn bounding_box_degrees(center: GeoPoint, half_width_deg: f64) -> GeoBox {
    let half = half_width_deg.abs();
    GeoBox {
        min_lon: normalize_longitude(center.longitude - half),
        min_lat: clamp_latitude(center.latitude - half),
        max_lon: normalize_longitude(center.longitude + half),
        max_lat: clamp_latitude(center.latitude + half),
    }
}

/// A position on the globe in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Returns `None` for non-finite values or a latitude outside `[-90, 90]`.
    /// The longitude is normalized.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 {
            return None;
        }
        Some(Self {
            latitude,
            longitude: normalize_longitude(longitude),
        })
    }

    pub fn from_radians(lat_rad: f64, lon_rad: f64) -> Option<Self> {
        Self::new(rad_to_deg(lat_rad), rad_to_deg(lon_rad))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
