//! Wire format of the scoring backend.
//!
//! - `POST /predict` with [`PredictRequest`] → [`PredictResponse`]
//! - `GET /progress/{session_id}` → [`ProgressResponse`]
//! - `GET /results/{session_id}` → [`ResultsResponse`]
//!
//! Tile records are parsed leniently: ids may be strings or numbers, scores
//! may arrive as numbers, numeric strings or garbage (which becomes NaN and is
//! dropped later by the renderer).

use foundation::geo::GeoPoint;
use foundation::model::{DEFAULT_TILE_WIDTH_DEG, Region, ScoredTile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Opaque backend session identifier.
pub type SessionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl From<&Region> for PredictRequest {
    fn from(region: &Region) -> Self {
        Self {
            latitude: region.center.latitude(),
            longitude: region.center.longitude(),
            radius_km: region.side_length_km,
        }
    }
}

/// The asynchronous variant returns a session; older backends answer with
/// the tiles directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Session { session_id: SessionId },
    Immediate { tiles: Vec<TileRecord> },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub completed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub tiles: Vec<TileRecord>,
}

impl ResultsResponse {
    pub fn into_tiles(self) -> Vec<ScoredTile> {
        self.into_tiles_with_width(DEFAULT_TILE_WIDTH_DEG)
    }

    /// Like [`into_tiles`](Self::into_tiles) with a caller-chosen width for
    /// records that omit `tile_width_deg`.
    pub fn into_tiles_with_width(self, default_width_deg: f64) -> Vec<ScoredTile> {
        tiles_from_records(self.tiles, default_width_deg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub score: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_width_deg: Option<f64>,
}

impl TileRecord {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, score: f64, tile_width_deg: f64) -> Self {
        Self {
            id: Some(Value::String(id.into())),
            lat,
            lon,
            score: serde_json::Number::from_f64(score)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            tile_width_deg: Some(tile_width_deg),
        }
    }

    /// Id as text; numbers are stringified and a missing id falls back to the
    /// record's position in the result list.
    pub fn id_text(&self, index: usize) -> String {
        match &self.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => index.to_string(),
        }
    }

    /// Numeric score, or NaN when the value is not a number.
    pub fn score_value(&self) -> f64 {
        match &self.score {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    pub fn to_tile(&self, index: usize, default_width_deg: f64) -> Option<ScoredTile> {
        let center = GeoPoint::new(self.lat, self.lon)?;
        let width = self
            .tile_width_deg
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(default_width_deg);
        Some(ScoredTile::new(self.id_text(index), center, self.score_value()).with_width(width))
    }
}

/// Converts wire records to tiles, dropping records without a valid position.
pub fn tiles_from_records(records: Vec<TileRecord>, default_width_deg: f64) -> Vec<ScoredTile> {
    let mut tiles = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match record.to_tile(index, default_width_deg) {
            Some(tile) => tiles.push(tile),
            None => warn!(
                "dropping tile record {} with invalid position ({}, {})",
                record.id_text(index),
                record.lat,
                record.lon
            ),
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_uses_radius_km_on_the_wire() {
        let region = Region::new(GeoPoint::new(40.0, -75.0).expect("valid"), 5.0);
        let body = serde_json::to_value(PredictRequest::from(&region)).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({"latitude": 40.0, "longitude": -75.0, "radius_km": 5.0})
        );
    }

    #[test]
    fn predict_response_accepts_both_variants() {
        let session: PredictResponse =
            serde_json::from_str(r#"{"session_id":"abc"}"#).expect("session");
        assert_eq!(
            session,
            PredictResponse::Session {
                session_id: "abc".to_string()
            }
        );

        let immediate: PredictResponse =
            serde_json::from_str(r#"{"tiles":[{"lat":1.0,"lon":2.0,"score":0.5}]}"#)
                .expect("tiles");
        let PredictResponse::Immediate { tiles } = immediate else {
            panic!("expected immediate variant");
        };
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn lenient_tile_parsing() {
        let body = r#"{"tiles":[
            {"id":"a","lat":40.0,"lon":-75.0,"score":0.72,"tile_width_deg":0.03},
            {"id":7,"lat":40.1,"lon":-75.1,"score":"0.25"},
            {"lat":40.2,"lon":-75.2,"score":"n/a"},
            {"id":"bad","lat":123.0,"lon":0.0,"score":0.5}
        ]}"#;
        let resp: ResultsResponse = serde_json::from_str(body).expect("results");
        let tiles = resp.into_tiles();
        assert_eq!(tiles.len(), 3);

        assert_eq!(tiles[0].id, "a");
        assert_eq!(tiles[0].width_deg, 0.03);
        assert_eq!(tiles[0].score, 0.72);

        assert_eq!(tiles[1].id, "7");
        assert_eq!(tiles[1].score, 0.25);
        assert_eq!(tiles[1].width_deg, DEFAULT_TILE_WIDTH_DEG);

        assert_eq!(tiles[2].id, "2");
        assert!(tiles[2].score.is_nan());
    }

    #[test]
    fn tile_record_constructor_round_trips() {
        let record = TileRecord::new("t1", 1.0, 2.0, 0.5, 0.022);
        let text = serde_json::to_string(&record).expect("serialize");
        let back: TileRecord = serde_json::from_str(&text).expect("parse");
        assert_eq!(back.id_text(0), "t1");
        assert_eq!(back.score_value(), 0.5);
    }
}
