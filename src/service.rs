//! Climate Service Module
//!
//! Typed facade over one query cache per dashboard query. Callers hold a
//! cloneable handle; there is no process-global state.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{CacheStats, QueryCache, QueryObserver, Snapshot, Subscription};
use crate::config::Config;
use crate::engine::{
    generate_global_stats, generate_history, ClimateHistory, GlobalStats, HistoryParams,
    NoisePolicy, Parameters, ProjectionEngine, ProjectionSeries, GLOBAL_STATS_KEY,
};
use crate::error::Result;

// == Service Stats ==
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub projections: CacheStats,
    pub history: CacheStats,
    pub global_stats: CacheStats,
    pub total: CacheStats,
}

// == Climate Service ==
#[derive(Clone)]
pub struct ClimateService {
    engine: ProjectionEngine,
    noise: NoisePolicy,
    projections: QueryCache<ProjectionSeries>,
    history: QueryCache<ClimateHistory>,
    global_stats: QueryCache<GlobalStats>,
}

impl ClimateService {
    // == Constructors ==
    /// Creates a service where every query waits `latency` before generating.
    pub fn new(engine: ProjectionEngine, noise: NoisePolicy, latency: Duration) -> Self {
        Self {
            engine,
            noise,
            projections: QueryCache::new("projections", latency),
            history: QueryCache::new("history", latency),
            global_stats: QueryCache::new("global_stats", latency),
        }
    }

    /// Creates a service from configuration, with per-query latencies.
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: ProjectionEngine::new(config.base_year, config.horizon_points),
            noise: config.noise_policy(),
            projections: QueryCache::new("projections", config.projection_latency()),
            history: QueryCache::new("history", config.history_latency()),
            global_stats: QueryCache::new("global_stats", config.stats_latency()),
        }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    // == Projections ==
    /// Requests the projection for `params`.
    ///
    /// Invalid parameters settle immediately as an Error entry and never
    /// reach the generator.
    pub async fn projection(&self, params: Parameters) -> Result<Subscription<ProjectionSeries>> {
        let params = params.normalized();
        let key = params.cache_key()?;

        if let Err(err) = params.validate() {
            warn!(key = %key, error = %err, "invalid projection parameters");
            return Ok(self.projections.reject(key, err).await);
        }

        let engine = self.engine;
        let noise = self.noise;
        let seed_key = key.clone();
        let subscription = self
            .projections
            .request(key, move || {
                let mut source = noise.source_for(&seed_key);
                engine.generate(&params, source.as_mut())
            })
            .await;
        Ok(subscription)
    }

    /// Points `observer` at the projection for `params`.
    pub async fn observe_projection(
        &self,
        observer: &mut QueryObserver<ProjectionSeries>,
        params: Parameters,
    ) -> Result<Option<Snapshot<ProjectionSeries>>> {
        observer.observe(self.projection(params).await?);
        Ok(observer.state())
    }

    /// Drops the cached projection for `params`.
    pub async fn invalidate_projection(&self, params: &Parameters) -> Result<bool> {
        let key = params.cache_key()?;
        Ok(self.projections.invalidate(&key).await)
    }

    /// Drops every cached projection whose parameters satisfy `predicate`.
    pub async fn invalidate_projections_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Parameters) -> bool,
    {
        self.projections
            .invalidate_matching(|key| {
                serde_json::from_str::<(String, Parameters)>(key)
                    .map(|(_, params)| predicate(&params))
                    .unwrap_or(false)
            })
            .await
    }

    // == History ==
    pub async fn climate_history(
        &self,
        params: HistoryParams,
    ) -> Result<Subscription<ClimateHistory>> {
        let key = params.cache_key()?;
        let noise = self.noise;
        let seed_key = key.clone();
        let subscription = self
            .history
            .request(key, move || {
                let mut source = noise.source_for(&seed_key);
                Ok(generate_history(&params, source.as_mut()))
            })
            .await;
        Ok(subscription)
    }

    pub async fn invalidate_history(&self, params: &HistoryParams) -> Result<bool> {
        let key = params.cache_key()?;
        Ok(self.history.invalidate(&key).await)
    }

    // == Global Stats ==
    pub async fn global_stats(&self) -> Subscription<GlobalStats> {
        let noise = self.noise;
        self.global_stats
            .request(GLOBAL_STATS_KEY, move || {
                let mut source = noise.source_for(GLOBAL_STATS_KEY);
                Ok(generate_global_stats(source.as_mut()))
            })
            .await
    }

    // == Maintenance ==
    /// Empties every cache. Returns the number of entries removed.
    pub async fn invalidate_all(&self) -> usize {
        let removed = self.projections.clear().await
            + self.history.clear().await
            + self.global_stats.clear().await;
        info!(removed, "cleared all queries");
        removed
    }

    /// Drops inactive settled queries older than `max_age` from every cache.
    pub async fn collect_garbage(&self, max_age: Duration) -> usize {
        self.projections.collect_garbage(max_age).await
            + self.history.collect_garbage(max_age).await
            + self.global_stats.collect_garbage(max_age).await
    }

    pub async fn stats(&self) -> ServiceStats {
        let projections = self.projections.stats().await;
        let history = self.history.stats().await;
        let global_stats = self.global_stats.stats().await;
        let total = projections.merge(&history).merge(&global_stats);
        ServiceStats {
            projections,
            history,
            global_stats,
            total,
        }
    }
}
