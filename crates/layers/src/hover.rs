//! Hover highlighting for heatmap tiles.
//!
//! Each overlay is either at baseline or elevated; at most one is elevated at
//! a time.

use scene::{GlobeSurface, OverlayHandle, ScreenPos};
use tracing::trace;

pub const BASELINE_ELEVATION_M: f64 = 0.0;
pub const DEFAULT_EXTRUSION_M: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HoverTracker {
    elevated: Option<OverlayHandle>,
    extrusion_m: f64,
    attached: bool,
}

impl Default for HoverTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRUSION_M)
    }
}

impl HoverTracker {
    pub fn new(extrusion_m: f64) -> Self {
        Self {
            elevated: None,
            extrusion_m,
            attached: true,
        }
    }

    pub fn elevated(&self) -> Option<OverlayHandle> {
        self.elevated
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Handles one cursor-move event and returns the elevated overlay, if any.
    pub fn on_cursor_move<S>(&mut self, surface: &mut S, pos: ScreenPos) -> Option<OverlayHandle>
    where
        S: GlobeSurface + ?Sized,
    {
        if !self.attached {
            return None;
        }

        let hit = surface.pick_overlay(pos);

        if let Some(current) = self.elevated
            && hit != Some(current)
        {
            surface.set_elevation(current, BASELINE_ELEVATION_M);
            self.elevated = None;
            trace!("hover: restored overlay {}", current.index());
        }

        if let Some(handle) = hit
            && self.elevated.is_none()
            && surface.overlay(handle).is_some_and(|o| o.is_heatmap_tile())
        {
            surface.set_elevation(handle, self.extrusion_m);
            self.elevated = Some(handle);
            trace!("hover: elevated overlay {}", handle.index());
        }

        self.elevated
    }

    /// Drops the elevated reference without touching the surface. Used after
    /// the overlay set it pointed into has been replaced.
    pub fn forget(&mut self) {
        self.elevated = None;
    }

    /// Stops reacting to cursor events. Elevation is not restored: the
    /// overlays are about to be removed.
    pub fn detach(&mut self) {
        self.attached = false;
        self.elevated = None;
    }
}
