use foundation::bounds::GeoBox;
use foundation::geo::GeoPoint;
use foundation::handles::Handle;

/// Opaque reference to a shape placed on a [`crate::GlobeSurface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub Handle);

impl OverlayHandle {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// Cursor or click position in canvas pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What an overlay stands for. Hover highlighting only reacts to heatmap tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    HeatmapTile { tile_id: String },
    SelectionPreview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Point with a text label, drawn on top of terrain.
    Marker {
        position: GeoPoint,
        label: String,
        color: [f32; 4],
        pixel_size: f32,
    },
    /// Ground-clamped translucent rectangle.
    Footprint {
        bounds: GeoBox,
        fill: [f32; 4],
        outline: Option<[f32; 4]>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub shape: Shape,
    /// Popup text shown when the overlay is selected.
    pub description: Option<String>,
    /// Extrusion above the ground in meters; zero is the baseline.
    pub elevation_m: f64,
}

impl Overlay {
    pub fn new(kind: OverlayKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            description: None,
            elevation_m: 0.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_heatmap_tile(&self) -> bool {
        matches!(self.kind, OverlayKind::HeatmapTile { .. })
    }

    pub fn tile_id(&self) -> Option<&str> {
        match &self.kind {
            OverlayKind::HeatmapTile { tile_id } => Some(tile_id),
            OverlayKind::SelectionPreview => None,
        }
    }
}
