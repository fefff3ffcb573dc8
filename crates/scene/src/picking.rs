use foundation::geo::GeoPoint;

use crate::overlay::{Overlay, OverlayHandle, Shape};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Markers are hit within this angular distance of their position.
    pub marker_radius_deg: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            marker_radius_deg: 0.002,
        }
    }
}

/// Deterministic overlay picking at a geographic point.
///
/// Ordering contract:
/// - The most elevated hit wins.
/// - Among equally elevated hits, the lower `OverlayHandle::index()` wins.
pub fn pick_at<'a, I>(overlays: I, point: GeoPoint, opts: PickOptions) -> Option<OverlayHandle>
where
    I: IntoIterator<Item = (OverlayHandle, &'a Overlay)>,
{
    let mut best: Option<(f64, OverlayHandle)> = None;

    for (handle, overlay) in overlays {
        if !hits(&overlay.shape, point, opts) {
            continue;
        }
        best = match best {
            None => Some((overlay.elevation_m, handle)),
            Some((be, bh)) => {
                let ord = be
                    .total_cmp(&overlay.elevation_m)
                    .then_with(|| handle.index().cmp(&bh.index()));
                if ord.is_lt() {
                    Some((overlay.elevation_m, handle))
                } else {
                    Some((be, bh))
                }
            }
        };
    }

    best.map(|(_, h)| h)
}

fn hits(shape: &Shape, point: GeoPoint, opts: PickOptions) -> bool {
    match shape {
        Shape::Footprint { bounds, .. } => bounds.contains(point),
        Shape::Marker { position, .. } => {
            let dlat = (position.latitude() - point.latitude()).abs();
            let mut dlon = (position.longitude() - point.longitude()).abs();
            if dlon > 180.0 {
                dlon = 360.0 - dlon;
            }
            dlat <= opts.marker_radius_deg && dlon <= opts.marker_radius_deg
        }
    }
}
