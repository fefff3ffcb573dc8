//! Region selection: pick a center on the globe, size it, confirm it.

use foundation::{GeoPoint, Region};
use layers::PreviewOverlays;
use scene::{GlobeSurface, ScreenPos};
use tracing::{debug, info};

/// Allowed side lengths of a selected region, in kilometers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SideLengthLimits {
    pub min_km: f64,
    pub max_km: f64,
    pub default_km: f64,
}

impl Default for SideLengthLimits {
    fn default() -> Self {
        Self {
            min_km: 1.0,
            max_km: 20.0,
            default_km: 5.0,
        }
    }
}

impl SideLengthLimits {
    /// Swaps inverted bounds and pulls the default into range.
    pub fn new(min_km: f64, max_km: f64, default_km: f64) -> Self {
        let (min_km, max_km) = if min_km <= max_km {
            (min_km, max_km)
        } else {
            (max_km, min_km)
        };
        Self {
            min_km,
            max_km,
            default_km: default_km.clamp(min_km, max_km),
        }
    }

    pub fn clamp(&self, km: f64) -> f64 {
        km.clamp(self.min_km, self.max_km)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Waiting for a click on the globe.
    SelectMode,
    /// A center is chosen and its preview is on the surface.
    Previewing { center: GeoPoint },
}

#[derive(Debug)]
pub struct RegionSelector {
    state: SelectionState,
    side_length_km: f64,
    limits: SideLengthLimits,
    preview: Option<PreviewOverlays>,
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(SideLengthLimits::default())
    }
}

impl RegionSelector {
    pub fn new(limits: SideLengthLimits) -> Self {
        Self {
            state: SelectionState::Idle,
            side_length_km: limits.default_km,
            limits,
            preview: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn side_length_km(&self) -> f64 {
        self.side_length_km
    }

    /// True while clicks on the globe choose a center.
    pub fn is_selecting(&self) -> bool {
        !matches!(self.state, SelectionState::Idle)
    }

    /// The region that `confirm` would submit right now.
    pub fn pending_region(&self) -> Option<Region> {
        match self.state {
            SelectionState::Previewing { center } => Some(Region::new(center, self.side_length_km)),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<&PreviewOverlays> {
        self.preview.as_ref()
    }

    /// `Idle` enters select mode; any other state returns to `Idle`.
    /// Either way the candidate region and its preview are discarded.
    pub fn toggle<S>(&mut self, surface: &mut S) -> SelectionState
    where
        S: GlobeSurface + ?Sized,
    {
        self.clear_preview(surface);
        self.state = match self.state {
            SelectionState::Idle => SelectionState::SelectMode,
            SelectionState::SelectMode | SelectionState::Previewing { .. } => SelectionState::Idle,
        };
        info!("selection state -> {:?}", self.state);
        self.state
    }

    /// Handles a click while selecting. Returns true when a new center was taken.
    pub fn on_click<S>(&mut self, surface: &mut S, pos: ScreenPos) -> bool
    where
        S: GlobeSurface + ?Sized,
    {
        if !self.is_selecting() {
            return false;
        }
        let Some(center) = surface.pick_coordinate(pos) else {
            debug!("click at ({}, {}) missed the globe", pos.x, pos.y);
            return false;
        };

        self.clear_preview(surface);
        let region = Region::new(center, self.side_length_km);
        self.preview = Some(PreviewOverlays::place(surface, &region));
        self.state = SelectionState::Previewing { center };
        info!(
            "region center selected at ({:.4}, {:.4}), side {} km",
            center.latitude(),
            center.longitude(),
            self.side_length_km
        );
        true
    }

    /// Clamps and stores the side length, redrawing the preview box when one
    /// is shown. Non-finite input is ignored. Returns the stored value.
    pub fn set_side_length<S>(&mut self, surface: &mut S, km: f64) -> f64
    where
        S: GlobeSurface + ?Sized,
    {
        if !km.is_finite() {
            return self.side_length_km;
        }
        self.side_length_km = self.limits.clamp(km);

        if let Some(region) = self.pending_region()
            && let Some(preview) = self.preview.as_mut()
        {
            preview.update_bounds(surface, &region);
        }
        self.side_length_km
    }

    /// Hands out the previewed region and returns to `Idle`.
    /// Outside `Previewing` this does nothing.
    pub fn confirm<S>(&mut self, surface: &mut S) -> Option<Region>
    where
        S: GlobeSurface + ?Sized,
    {
        let region = self.pending_region()?;
        self.clear_preview(surface);
        self.state = SelectionState::Idle;
        info!(
            "region confirmed at ({:.4}, {:.4}), side {} km",
            region.center.latitude(),
            region.center.longitude(),
            region.side_length_km
        );
        Some(region)
    }

    /// Drops any selection in progress.
    pub fn reset<S>(&mut self, surface: &mut S)
    where
        S: GlobeSurface + ?Sized,
    {
        self.clear_preview(surface);
        self.state = SelectionState::Idle;
    }

    fn clear_preview<S>(&mut self, surface: &mut S)
    where
        S: GlobeSurface + ?Sized,
    {
        if let Some(preview) = self.preview.take() {
            preview.remove(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::{MemorySurface, Viewport};

    fn surface() -> MemorySurface {
        // 0.01 deg/px on a 200x100 canvas centered at (40, -75).
        let center = GeoPoint::new(40.0, -75.0).expect("valid point");
        MemorySurface::new(Viewport::new(center, 0.01, 200.0, 100.0))
    }

    fn center_of_canvas() -> ScreenPos {
        ScreenPos::new(100.0, 50.0)
    }

    #[test]
    fn toggle_click_confirm_cycle() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        assert_eq!(selector.state(), SelectionState::Idle);

        assert_eq!(selector.toggle(&mut surface), SelectionState::SelectMode);
        assert!(selector.on_click(&mut surface, center_of_canvas()));

        let SelectionState::Previewing { center } = selector.state() else {
            panic!("expected preview, got {:?}", selector.state());
        };
        assert!((center.latitude() - 40.0).abs() < 1e-9);
        assert!((center.longitude() + 75.0).abs() < 1e-9);
        assert_eq!(surface.len(), 2);

        let region = selector.confirm(&mut surface).expect("region");
        assert_eq!(region.center, center);
        assert_eq!(region.side_length_km, 5.0);
        assert_eq!(selector.state(), SelectionState::Idle);
        assert!(surface.is_empty());
        assert!(selector.preview().is_none());
    }

    #[test]
    fn click_off_globe_leaves_state_unchanged() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        selector.toggle(&mut surface);

        assert!(!selector.on_click(&mut surface, ScreenPos::new(-5.0, 10.0)));
        assert_eq!(selector.state(), SelectionState::SelectMode);
        assert!(surface.is_empty());
    }

    #[test]
    fn missed_click_keeps_the_current_preview() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        selector.toggle(&mut surface);
        assert!(selector.on_click(&mut surface, center_of_canvas()));
        let before = selector.state();
        let (marker, bounds) = {
            let preview = selector.preview().expect("preview shown");
            (preview.marker(), preview.bounds())
        };

        assert!(!selector.on_click(&mut surface, ScreenPos::new(250.0, 50.0)));
        assert_eq!(selector.state(), before);
        let preview = selector.preview().expect("preview kept");
        assert_eq!(preview.marker(), marker);
        assert_eq!(preview.bounds(), bounds);
        assert_eq!(surface.len(), 2);
        assert!(surface.overlay(marker).is_some());
        assert!(surface.overlay(bounds).is_some());
    }

    #[test]
    fn clicks_are_ignored_when_idle() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        assert!(!selector.on_click(&mut surface, center_of_canvas()));
        assert_eq!(selector.state(), SelectionState::Idle);
        assert!(surface.is_empty());
    }

    #[test]
    fn confirm_outside_preview_is_a_no_op() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        assert!(selector.confirm(&mut surface).is_none());
        selector.toggle(&mut surface);
        assert!(selector.confirm(&mut surface).is_none());
        assert_eq!(selector.state(), SelectionState::SelectMode);
    }

    #[test]
    fn reclick_moves_the_preview() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        selector.toggle(&mut surface);
        selector.on_click(&mut surface, center_of_canvas());
        selector.on_click(&mut surface, ScreenPos::new(150.0, 50.0));

        let region = selector.pending_region().expect("region");
        assert!((region.center.longitude() + 74.5).abs() < 1e-9);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn toggling_off_discards_the_preview() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        selector.toggle(&mut surface);
        selector.on_click(&mut surface, center_of_canvas());

        assert_eq!(selector.toggle(&mut surface), SelectionState::Idle);
        assert!(surface.is_empty());
        assert!(selector.pending_region().is_none());
    }

    #[test]
    fn side_length_is_clamped_and_redraws_the_box() {
        let mut surface = surface();
        let mut selector = RegionSelector::default();
        assert_eq!(selector.set_side_length(&mut surface, 50.0), 20.0);
        assert_eq!(selector.set_side_length(&mut surface, 0.1), 1.0);
        assert_eq!(selector.set_side_length(&mut surface, f64::NAN), 1.0);

        selector.toggle(&mut surface);
        selector.on_click(&mut surface, center_of_canvas());
        let before = selector.preview().expect("preview").bounds();

        selector.set_side_length(&mut surface, 10.0);
        let preview = selector.preview().expect("preview");
        assert_ne!(preview.bounds(), before);
        assert_eq!(surface.len(), 2);
        assert!(matches!(selector.state(), SelectionState::Previewing { .. }));
        assert_eq!(selector.pending_region().expect("region").side_length_km, 10.0);
    }

    #[test]
    fn limits_are_normalized() {
        let limits = SideLengthLimits::new(30.0, 2.0, 50.0);
        assert_eq!(limits.min_km, 2.0);
        assert_eq!(limits.max_km, 30.0);
        assert_eq!(limits.default_km, 30.0);
    }
}
