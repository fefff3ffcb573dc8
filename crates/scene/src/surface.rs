use foundation::geo::GeoPoint;

use crate::overlay::{Overlay, OverlayHandle, ScreenPos};

/// The slice of a 3-D globe engine the pipeline depends on.
///
/// Implementations are driven from a single event-loop thread; no method is
/// expected to block.
pub trait GlobeSurface {
    /// Places a geo-anchored shape and returns its handle.
    fn place(&mut self, overlay: Overlay) -> OverlayHandle;

    /// Removes a shape. Returns `false` if the handle is unknown or stale.
    fn remove(&mut self, handle: OverlayHandle) -> bool;

    fn overlay(&self, handle: OverlayHandle) -> Option<&Overlay>;

    /// Returns `false` if the handle is unknown or stale.
    fn set_elevation(&mut self, handle: OverlayHandle, elevation_m: f64) -> bool;

    /// World coordinate under a click, or `None` when the click misses the globe.
    fn pick_coordinate(&self, pos: ScreenPos) -> Option<GeoPoint>;

    /// Topmost overlay under the cursor.
    fn pick_overlay(&self, pos: ScreenPos) -> Option<OverlayHandle>;
}
