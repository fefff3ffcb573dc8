//! Tile heatmap overlay lifecycle.
//!
//! The renderer owns the `tile id -> OverlayHandle` map for the current tile
//! set. Every call to [`HeatmapRenderer::render`] removes the whole previous
//! set before placing the new one, so the surface never shows tiles from two
//! different result sets.

use std::collections::BTreeMap;

use foundation::model::{DEFAULT_TILE_WIDTH_DEG, ScoredTile};
use scene::{GlobeSurface, Overlay, OverlayHandle, OverlayKind, Shape};
use streaming::{Url, tile_image_url};
use tracing::{debug, info, warn};

use crate::symbology::{ScoreBand, clamp_score};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub removed: usize,
    pub placed: usize,
    /// Tiles dropped because their score is not a number.
    pub skipped_invalid: usize,
    /// Tiles dropped because an earlier tile in the same set had the same id.
    pub skipped_duplicate: usize,
}

#[derive(Debug, Default)]
pub struct HeatmapRenderer {
    overlays: BTreeMap<String, OverlayHandle>,
    imagery_base_url: Option<Url>,
}

impl HeatmapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tile popups link to `{base}/tiles/{id}.png` when set.
    pub fn with_imagery_base_url(mut self, base_url: Url) -> Self {
        self.imagery_base_url = Some(base_url);
        self
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn handle(&self, tile_id: &str) -> Option<OverlayHandle> {
        self.overlays.get(tile_id).copied()
    }

    /// Tile ids of the current set in ascending order.
    pub fn tile_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.overlays.keys().map(String::as_str)
    }

    /// Replaces the current overlay set with one overlay per valid tile.
    pub fn render<S>(&mut self, surface: &mut S, tiles: &[ScoredTile]) -> RenderSummary
    where
        S: GlobeSurface + ?Sized,
    {
        let mut summary = RenderSummary {
            removed: self.clear(surface),
            ..RenderSummary::default()
        };

        for tile in tiles {
            let Some(overlay) = tile_overlay(tile, self.imagery_base_url.as_ref()) else {
                debug!("skipping tile {} with non-numeric score", tile.id);
                summary.skipped_invalid += 1;
                continue;
            };
            if self.overlays.contains_key(&tile.id) {
                warn!("skipping duplicate tile id {}", tile.id);
                summary.skipped_duplicate += 1;
                continue;
            }
            let handle = surface.place(overlay);
            self.overlays.insert(tile.id.clone(), handle);
            summary.placed += 1;
        }

        info!(
            "heatmap rendered: placed={} removed={} invalid={} duplicate={}",
            summary.placed, summary.removed, summary.skipped_invalid, summary.skipped_duplicate
        );
        summary
    }

    /// Removes every overlay of the current set. Returns how many were removed.
    pub fn clear<S>(&mut self, surface: &mut S) -> usize
    where
        S: GlobeSurface + ?Sized,
    {
        let mut removed = 0usize;
        for (tile_id, handle) in std::mem::take(&mut self.overlays) {
            if surface.remove(handle) {
                removed += 1;
            } else {
                warn!("heatmap overlay for tile {tile_id} was already gone");
            }
        }
        removed
    }
}

/// Builds the overlay for one tile, or `None` when its score is not a number.
pub fn tile_overlay(tile: &ScoredTile, imagery_base_url: Option<&Url>) -> Option<Overlay> {
    let score = clamp_score(tile.score)?;
    let band = ScoreBand::for_score(score)?;

    let width_deg = if tile.width_deg.is_finite() && tile.width_deg > 0.0 {
        tile.width_deg
    } else {
        DEFAULT_TILE_WIDTH_DEG
    };
    let bounds = tile.clone().with_width(width_deg).footprint();

    let overlay = Overlay::new(
        OverlayKind::HeatmapTile {
            tile_id: tile.id.clone(),
        },
        Shape::Footprint {
            bounds,
            fill: band.style().rgba(),
            outline: None,
        },
    )
    .with_description(tile_description(tile, score, imagery_base_url));

    Some(overlay)
}

/// Popup text for a tile.
pub fn tile_description(tile: &ScoredTile, score: f64, imagery_base_url: Option<&Url>) -> String {
    let mut text = format!(
        "Score: {score:.3}\nLatitude: {:.5}\nLongitude: {:.5}",
        tile.center.latitude(),
        tile.center.longitude()
    );
    if let Some(base) = imagery_base_url {
        match tile_image_url(base, &tile.id) {
            Ok(link) => text.push_str(&format!("\nImagery: {link}")),
            Err(err) => warn!("no imagery link for tile {}: {err}", tile.id),
        }
    }
    text
}
