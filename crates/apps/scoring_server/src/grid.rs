//! Tile grid covering a requested region, and the stand-in scorer.

/// Ground size of one scored tile.
pub const TILE_SIZE_KM: f64 = 2.56;

const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GridTile {
    pub id: u64,
    pub lat_min: f64,
    pub lon_min: f64,
    pub size_deg: f64,
}

impl GridTile {
    pub fn center_lat(&self) -> f64 {
        self.lat_min + self.size_deg / 2.0
    }

    pub fn center_lon(&self) -> f64 {
        self.lon_min + self.size_deg / 2.0
    }
}

/// Row-major grid starting at the south-west corner of the square
/// `radius_km` around the center. The last row and column may overhang.
pub fn tile_grid(latitude: f64, longitude: f64, radius_km: f64) -> Vec<GridTile> {
    let radius_deg = radius_km / KM_PER_DEGREE;
    let size_deg = TILE_SIZE_KM / KM_PER_DEGREE;
    if !radius_deg.is_finite() || radius_deg <= 0.0 {
        return Vec::new();
    }

    let lat_min = latitude - radius_deg;
    let lat_max = latitude + radius_deg;
    let lon_min = longitude - radius_deg;
    let lon_max = longitude + radius_deg;

    let mut tiles = Vec::new();
    let mut id = 0u64;
    let mut row = 0u32;
    while lat_min + f64::from(row) * size_deg < lat_max {
        let lat = lat_min + f64::from(row) * size_deg;
        let mut col = 0u32;
        while lon_min + f64::from(col) * size_deg < lon_max {
            tiles.push(GridTile {
                id,
                lat_min: lat,
                lon_min: lon_min + f64::from(col) * size_deg,
                size_deg,
            });
            id += 1;
            col += 1;
        }
        row += 1;
    }
    tiles
}

/// Deterministic placeholder score in `[0, 1]`, rounded to two decimals.
pub fn score_tile(lat: f64, lon: f64) -> f64 {
    let wave = (lat * 12.9898 + lon * 78.233).sin() * 0.5 + 0.5;
    (wave.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
