//! Environment-driven client configuration.

use std::env;
use std::time::Duration;

use runtime::PollSchedule;

use crate::selection::SideLengthLimits;

pub const DEFAULT_BASE_URL: &str = "https://terrabite.onrender.com";

#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConfig {
    pub base_url: String,
    /// Per-request timeout. `None` waits as long as the transport allows.
    pub request_timeout: Option<Duration>,
    pub poll: PollSchedule,
    pub side_length: SideLengthLimits,
    /// Footprint width for tiles that omit `tile_width_deg`.
    pub tile_width_deg: f64,
    pub hover_extrusion_m: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            poll: PollSchedule::default(),
            side_length: SideLengthLimits::default(),
            tile_width_deg: foundation::DEFAULT_TILE_WIDTH_DEG,
            hover_extrusion_m: layers::DEFAULT_EXTRUSION_M,
        }
    }
}

impl GlobeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unparseable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let vars = Vars(&lookup);

        let poll = PollSchedule {
            interval: Duration::from_millis(vars.u64("POLL_INTERVAL_MS", 1000)),
            max_consecutive_failures: vars.u32(
                "POLL_MAX_FAILURES",
                defaults.poll.max_consecutive_failures,
            ),
            max_wait: vars.opt_u64("POLL_MAX_WAIT_S").map(Duration::from_secs),
        };

        let side_length = SideLengthLimits::new(
            vars.f64("SIDE_LENGTH_MIN_KM", defaults.side_length.min_km),
            vars.f64("SIDE_LENGTH_MAX_KM", defaults.side_length.max_km),
            vars.f64("SIDE_LENGTH_DEFAULT_KM", defaults.side_length.default_km),
        );

        let tile_width_deg = vars.f64("TILE_WIDTH_DEG", defaults.tile_width_deg);

        Self {
            base_url: vars.string("SCORING_BASE_URL", &defaults.base_url),
            request_timeout: vars.opt_u64("REQUEST_TIMEOUT_S").map(Duration::from_secs),
            poll,
            side_length,
            tile_width_deg: if tile_width_deg > 0.0 {
                tile_width_deg
            } else {
                defaults.tile_width_deg
            },
            hover_extrusion_m: vars.f64("HOVER_EXTRUSION_M", defaults.hover_extrusion_m),
        }
    }
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn u32(&self, key: &str, default: u32) -> u32 {
        (self.0)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn u64(&self, key: &str, default: u64) -> u64 {
        self.opt_u64(key).unwrap_or(default)
    }

    fn opt_u64(&self, key: &str) -> Option<u64> {
        (self.0)(key).and_then(|v| v.trim().parse().ok())
    }

    fn f64(&self, key: &str, default: f64) -> f64 {
        (self.0)(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }
}
