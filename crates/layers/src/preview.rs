use foundation::geo::GeoPoint;
use foundation::model::Region;
use scene::{GlobeSurface, Overlay, OverlayHandle, OverlayKind, Shape};

use crate::symbology::{CYAN, FillStyle};

const MARKER_PIXEL_SIZE: f32 = 10.0;
const BOX_FILL: FillStyle = FillStyle::new(CYAN, 0.2);

pub fn marker_label(center: GeoPoint) -> String {
    format!(
        "Lat: {:.4}°\nLon: {:.4}°",
        center.latitude(),
        center.longitude()
    )
}

pub fn preview_marker(center: GeoPoint) -> Overlay {
    Overlay::new(
        OverlayKind::SelectionPreview,
        Shape::Marker {
            position: center,
            label: marker_label(center),
            color: FillStyle::new(CYAN, 1.0).rgba(),
            pixel_size: MARKER_PIXEL_SIZE,
        },
    )
}

pub fn preview_box(region: &Region) -> Overlay {
    Overlay::new(
        OverlayKind::SelectionPreview,
        Shape::Footprint {
            bounds: region.bounds(),
            fill: BOX_FILL.rgba(),
            outline: Some(FillStyle::new(CYAN, 1.0).rgba()),
        },
    )
}

/// Overlays drawn for a candidate region: a labelled center point and its box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PreviewOverlays {
    marker: OverlayHandle,
    bounds: OverlayHandle,
}

impl PreviewOverlays {
    pub fn place<S>(surface: &mut S, region: &Region) -> Self
    where
        S: GlobeSurface + ?Sized,
    {
        Self {
            marker: surface.place(preview_marker(region.center)),
            bounds: surface.place(preview_box(region)),
        }
    }

    /// Redraws the box for a new side length; the marker stays.
    pub fn update_bounds<S>(&mut self, surface: &mut S, region: &Region)
    where
        S: GlobeSurface + ?Sized,
    {
        surface.remove(self.bounds);
        self.bounds = surface.place(preview_box(region));
    }

    pub fn remove<S>(self, surface: &mut S)
    where
        S: GlobeSurface + ?Sized,
    {
        surface.remove(self.marker);
        surface.remove(self.bounds);
    }

    pub fn marker(&self) -> OverlayHandle {
        self.marker
    }

    pub fn bounds(&self) -> OverlayHandle {
        self.bounds
    }
}
