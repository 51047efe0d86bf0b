//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::engine::NoisePolicy;

/// Accepted range for `BASE_YEAR`.
pub const BASE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1850..=3000;
/// Largest accepted `HORIZON_POINTS`.
pub const MAX_HORIZON_POINTS: u32 = 1000;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Simulated latency of a projection fetch in milliseconds
    pub projection_latency_ms: u64,
    /// Simulated latency of a climate history fetch in milliseconds
    pub history_latency_ms: u64,
    /// Simulated latency of a global statistics fetch in milliseconds
    pub stats_latency_ms: u64,
    /// First year of every projection
    pub base_year: i32,
    /// Number of yearly points in a projection without an explicit time range
    pub horizon_points: u32,
    /// Seed for reproducible noise, None = fresh entropy per fetch
    pub noise_seed: Option<u64>,
    /// Turns the noise term off entirely
    pub noise_disabled: bool,
    /// Interval in seconds between inactive-query sweeps
    pub gc_interval: u64,
    /// Age in seconds after which an unobserved settled query is dropped
    pub gc_time: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PROJECTION_LATENCY_MS` - Projection fetch delay (default: 1800)
    /// - `HISTORY_LATENCY_MS` - History fetch delay (default: 1500)
    /// - `STATS_LATENCY_MS` - Global stats fetch delay (default: 1000)
    /// - `BASE_YEAR` - First projected year (default: 2024)
    /// - `HORIZON_POINTS` - Yearly points per projection (default: 76)
    /// - `NOISE_SEED` - Noise seed (default: unset, random)
    /// - `NOISE_DISABLED` - Disable noise (default: false)
    /// - `GC_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `GC_TIME` - Inactive query lifetime in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            projection_latency_ms: env_or("PROJECTION_LATENCY_MS", defaults.projection_latency_ms),
            history_latency_ms: env_or("HISTORY_LATENCY_MS", defaults.history_latency_ms),
            stats_latency_ms: env_or("STATS_LATENCY_MS", defaults.stats_latency_ms),
            base_year: env_or("BASE_YEAR", defaults.base_year),
            horizon_points: env_or("HORIZON_POINTS", defaults.horizon_points),
            noise_seed: env::var("NOISE_SEED").ok().and_then(|v| v.parse().ok()),
            noise_disabled: env_or("NOISE_DISABLED", defaults.noise_disabled),
            gc_interval: env_or("GC_INTERVAL", defaults.gc_interval),
            gc_time: env_or("GC_TIME", defaults.gc_time),
        }
        .validated()
    }

    /// Replaces out-of-range projection settings with their defaults.
    ///
    /// A horizon must have at least one point and every projected year must
    /// stay inside [`BASE_YEAR_RANGE`] plus the horizon.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !BASE_YEAR_RANGE.contains(&self.base_year) {
            warn!(
                "BASE_YEAR {} outside {:?}, using {}",
                self.base_year, BASE_YEAR_RANGE, defaults.base_year
            );
            self.base_year = defaults.base_year;
        }
        if self.horizon_points == 0 || self.horizon_points > MAX_HORIZON_POINTS {
            warn!(
                "HORIZON_POINTS {} outside 1..={}, using {}",
                self.horizon_points, MAX_HORIZON_POINTS, defaults.horizon_points
            );
            self.horizon_points = defaults.horizon_points;
        }
        self
    }

    /// Returns the noise policy selected by `noise_disabled` and `noise_seed`.
    pub fn noise_policy(&self) -> NoisePolicy {
        if self.noise_disabled {
            return NoisePolicy::Disabled;
        }
        match self.noise_seed {
            Some(seed) => NoisePolicy::Seeded(seed),
            None => NoisePolicy::Entropy,
        }
    }

    pub fn projection_latency(&self) -> Duration {
        Duration::from_millis(self.projection_latency_ms)
    }

    pub fn history_latency(&self) -> Duration {
        Duration::from_millis(self.history_latency_ms)
    }

    pub fn stats_latency(&self) -> Duration {
        Duration::from_millis(self.stats_latency_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            projection_latency_ms: 1800,
            history_latency_ms: 1500,
            stats_latency_ms: 1000,
            base_year: 2024,
            horizon_points: 76,
            noise_seed: None,
            noise_disabled: false,
            gc_interval: 30,
            gc_time: 300,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
