use foundation::arena::Slots;
use foundation::geo::GeoPoint;

use crate::overlay::{Overlay, OverlayHandle, ScreenPos};
use crate::picking::{PickOptions, pick_at};
use crate::surface::GlobeSurface;

/// Plate carrée view of the globe onto a pixel canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub deg_per_px: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(center: GeoPoint, deg_per_px: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            deg_per_px,
            width_px: width_px.max(1.0),
            height_px: height_px.max(1.0),
        }
    }

    /// `None` outside the canvas or beyond the poles.
    pub fn screen_to_geo(&self, pos: ScreenPos) -> Option<GeoPoint> {
        if pos.x < 0.0 || pos.y < 0.0 || pos.x > self.width_px || pos.y > self.height_px {
            return None;
        }
        let lon = self.center.longitude() + (pos.x - self.width_px / 2.0) * self.deg_per_px;
        let lat = self.center.latitude() - (pos.y - self.height_px / 2.0) * self.deg_per_px;
        GeoPoint::new(lat, lon)
    }

    pub fn geo_to_screen(&self, p: GeoPoint) -> ScreenPos {
        let mut dlon = p.longitude() - self.center.longitude();
        if dlon >= 180.0 {
            dlon -= 360.0;
        } else if dlon < -180.0 {
            dlon += 360.0;
        }
        ScreenPos::new(
            self.width_px / 2.0 + dlon / self.deg_per_px,
            self.height_px / 2.0 - (p.latitude() - self.center.latitude()) / self.deg_per_px,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        // Whole globe on a 1440x720 canvas.
        Self {
            center: GeoPoint::ORIGIN,
            deg_per_px: 0.25,
            width_px: 1440.0,
            height_px: 720.0,
        }
    }
}

/// Headless globe engine backed by a generational arena.
///
/// Keeps placement/removal counters so callers can check that overlays are
/// neither leaked nor removed twice.
#[derive(Debug, Default)]
pub struct MemorySurface {
    overlays: Slots<Overlay>,
    viewport: Viewport,
    pick: PickOptions,
    placed_total: u64,
    removed_total: u64,
}

impl MemorySurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn overlays(&self) -> impl Iterator<Item = (OverlayHandle, &Overlay)> + '_ {
        self.overlays.iter().map(|(h, o)| (OverlayHandle(h), o))
    }

    pub fn heatmap_tile_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .overlays()
            .filter_map(|(_, o)| o.tile_id().map(str::to_string))
            .collect();
        ids.sort();
        ids
    }

    pub fn placed_total(&self) -> u64 {
        self.placed_total
    }

    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }
}

impl GlobeSurface for MemorySurface {
    fn place(&mut self, overlay: Overlay) -> OverlayHandle {
        self.placed_total += 1;
        OverlayHandle(self.overlays.insert(overlay))
    }

    fn remove(&mut self, handle: OverlayHandle) -> bool {
        let removed = self.overlays.remove(handle.0).is_some();
        if removed {
            self.removed_total += 1;
        }
        removed
    }

    fn overlay(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.overlays.get(handle.0)
    }

    fn set_elevation(&mut self, handle: OverlayHandle, elevation_m: f64) -> bool {
        match self.overlays.get_mut(handle.0) {
            Some(o) => {
                o.elevation_m = elevation_m;
                true
            }
            None => false,
        }
    }

    fn pick_coordinate(&self, pos: ScreenPos) -> Option<GeoPoint> {
        self.viewport.screen_to_geo(pos)
    }

    fn pick_overlay(&self, pos: ScreenPos) -> Option<OverlayHandle> {
        let point = self.viewport.screen_to_geo(pos)?;
        pick_at(self.overlays(), point, self.pick)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySurface, Viewport};
    use crate::overlay::{Overlay, OverlayKind, ScreenPos, Shape};
    use crate::surface::GlobeSurface;
    use foundation::bounds::GeoBox;
    use foundation::geo::GeoPoint;

    fn footprint(bounds: GeoBox) -> Overlay {
        Overlay::new(
            OverlayKind::HeatmapTile {
                tile_id: "t".to_string(),
            },
            Shape::Footprint {
                bounds,
                fill: [1.0, 0.0, 0.0, 0.6],
                outline: None,
            },
        )
    }

    #[test]
    fn screen_mapping_round_trips() {
        let vp = Viewport::default();
        let p = GeoPoint::new(40.0, -75.0).expect("valid");
        let s = vp.geo_to_screen(p);
        let back = vp.screen_to_geo(s).expect("on globe");
        assert!((back.latitude() - 40.0).abs() < 1e-9);
        assert!((back.longitude() - -75.0).abs() < 1e-9);
    }

    #[test]
    fn clicks_beyond_the_poles_miss() {
        let vp = Viewport::new(GeoPoint::new(80.0, 0.0).expect("valid"), 0.25, 800.0, 600.0);
        assert!(vp.screen_to_geo(ScreenPos::new(400.0, 0.0)).is_none());
        assert!(vp.screen_to_geo(ScreenPos::new(-1.0, 300.0)).is_none());
        assert!(vp.screen_to_geo(ScreenPos::new(400.0, 300.0)).is_some());
    }

    #[test]
    fn place_remove_and_pick() {
        let mut surface = MemorySurface::default();
        let h = surface.place(footprint(GeoBox::new(-1.0, -1.0, 1.0, 1.0)));
        let center = surface.viewport().geo_to_screen(GeoPoint::new(0.0, 0.0).expect("valid"));
        assert_eq!(surface.pick_overlay(center), Some(h));
        assert!(surface.set_elevation(h, 25.0));
        assert_eq!(surface.overlay(h).map(|o| o.elevation_m), Some(25.0));

        assert!(surface.remove(h));
        assert!(!surface.remove(h));
        assert!(!surface.set_elevation(h, 0.0));
        assert_eq!(surface.pick_overlay(center), None);
        assert_eq!(surface.placed_total(), 1);
        assert_eq!(surface.removed_total(), 1);
    }
}
