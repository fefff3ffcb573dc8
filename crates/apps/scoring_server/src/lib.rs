//! Development scoring backend speaking the `/predict` → `/progress` →
//! `/results` protocol with a deterministic placeholder scorer.

pub mod app;
pub mod config;
pub mod grid;
pub mod sessions;

pub use app::{AppState, router, spawn_cleanup};
pub use config::ServerConfig;
