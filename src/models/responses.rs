//! Response DTOs for the projection API
//!
//! Query reads are answered with the cache entry snapshot itself; the types
//! here cover maintenance and health endpoints.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::service::ServiceStats;

/// Response body for invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of cache entries removed
    pub removed: usize,
    pub message: String,
}

impl InvalidateResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            removed,
            message: format!("{} queries invalidated", removed),
        }
    }
}

/// Per-cache counters plus derived hit rate
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub counters: CacheStats,
    /// Share of requests served without a new fetch
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(counters: CacheStats) -> Self {
        let hit_rate = counters.hit_rate();
        Self { counters, hit_rate }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub projections: CacheStatsResponse,
    pub history: CacheStatsResponse,
    pub global_stats: CacheStatsResponse,
    pub total: CacheStatsResponse,
}

impl From<ServiceStats> for StatsResponse {
    fn from(stats: ServiceStats) -> Self {
        Self {
            projections: stats.projections.into(),
            history: stats.history.into(),
            global_stats: stats.global_stats.into(),
            total: stats.total.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
