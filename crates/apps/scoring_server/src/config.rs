use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directory served under `/tiles/`.
    pub tile_image_root: PathBuf,
    pub session_max_age: Duration,
    pub cleanup_interval: Duration,
    /// Tiles scored per progress poll.
    pub tiles_per_poll: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            tile_image_root: PathBuf::from("temp_tiles"),
            session_max_age: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(3600),
            tiles_per_poll: 8,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparseable numeric values keep their defaults; a bad
    /// `SCORING_ADDR` is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();
        let addr = match lookup("SCORING_ADDR") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|err| format!("invalid SCORING_ADDR {raw:?}: {err}"))?,
            None => defaults.addr,
        };
        let secs = |key: &str, default: Duration| {
            parsed::<u64>(&lookup, key)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };
        Ok(Self {
            addr,
            tile_image_root: lookup("TILE_IMAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.tile_image_root),
            session_max_age: secs("SESSION_MAX_AGE_S", defaults.session_max_age),
            cleanup_interval: secs("SESSION_CLEANUP_INTERVAL_S", defaults.cleanup_interval)
                .max(Duration::from_secs(1)),
            tiles_per_poll: parsed(&lookup, "TILES_PER_POLL")
                .unwrap_or(defaults.tiles_per_poll)
                .max(1),
        })
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
