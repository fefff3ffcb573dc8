//! In-memory scoring sessions.
//!
//! A session holds the grid of its region and scores it incrementally: each
//! progress poll reports the current count and then scores one more batch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use streaming::protocol::{ProgressResponse, TileRecord};
use tracing::{debug, info};

use crate::grid::{GridTile, score_tile};

struct Session {
    grid: Vec<GridTile>,
    scored: Vec<TileRecord>,
    created: Instant,
}

impl Session {
    fn progress(&self) -> ProgressResponse {
        ProgressResponse {
            completed: self.scored.len() as u64,
            total: self.grid.len() as u64,
        }
    }

    fn score_batch(&mut self, batch: usize) {
        let start = self.scored.len();
        let end = (start + batch).min(self.grid.len());
        for tile in &self.grid[start..end] {
            let (lat, lon) = (tile.center_lat(), tile.center_lon());
            self.scored.push(TileRecord::new(
                tile.id.to_string(),
                lat,
                lon,
                score_tile(lat, lon),
                tile.size_deg,
            ));
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResultsError {
    UnknownSession,
    NotReady(ProgressResponse),
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn create(&self, grid: Vec<GridTile>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let total = grid.len();
        self.sessions.write().insert(
            id.clone(),
            Session {
                scored: Vec::with_capacity(total),
                grid,
                created: Instant::now(),
            },
        );
        info!("session {id} created with {total} tiles");
        id
    }

    /// Reports progress, then scores up to `batch` more tiles.
    pub fn poll(&self, id: &str, batch: usize) -> Option<ProgressResponse> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(id)?;
        let progress = session.progress();
        session.score_batch(batch);
        debug!("session {id}: {} of {}", progress.completed, progress.total);
        Some(progress)
    }

    pub fn results(&self, id: &str) -> Result<Vec<TileRecord>, ResultsError> {
        let sessions = self.sessions.read();
        let session = sessions.get(id).ok_or(ResultsError::UnknownSession)?;
        if session.scored.len() < session.grid.len() {
            return Err(ResultsError::NotReady(session.progress()));
        }
        Ok(session.scored.clone())
    }

    /// Drops sessions older than `max_age`. Returns how many were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.created.elapsed() <= max_age);
        before - sessions.len()
    }
}
