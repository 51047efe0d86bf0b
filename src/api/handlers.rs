//! API Handlers
//!
//! HTTP request handlers for each projection service endpoint. Query reads
//! return the cache entry snapshot for the requested key.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::cache::{Snapshot, Subscription};
use crate::config::Config;
use crate::engine::{ClimateHistory, GlobalStats, ProjectionSeries};
use crate::error::Result;
use crate::models::{
    HealthResponse, HistoryQuery, InvalidateResponse, ProjectionQuery, StatsResponse, WaitQuery,
};
use crate::service::ClimateService;

/// Application state shared across all handlers.
///
/// Holds a handle to the service; the caches behind it are shared by clones.
#[derive(Clone)]
pub struct AppState {
    pub service: ClimateService,
}

impl AppState {
    /// Creates a new AppState with the given service.
    pub fn new(service: ClimateService) -> Self {
        Self { service }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ClimateService::from_config(config))
    }
}

/// Returns the current snapshot, or the settled one when `wait` is set.
async fn read<T>(mut subscription: Subscription<T>, wait: bool) -> Result<Snapshot<T>> {
    if wait {
        subscription.settled().await
    } else {
        Ok(subscription.current())
    }
}

/// Handler for GET /projections
pub async fn projection_handler(
    State(state): State<AppState>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<Snapshot<ProjectionSeries>>> {
    let params = query.to_parameters()?;
    let subscription = state.service.projection(params).await?;
    Ok(Json(read(subscription, query.wait).await?))
}

/// Handler for DELETE /projections
///
/// Invalidates the projection identified by the query string.
pub async fn invalidate_projection_handler(
    State(state): State<AppState>,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<InvalidateResponse>> {
    let params = query.to_parameters()?;
    let removed = state.service.invalidate_projection(&params).await?;
    Ok(Json(InvalidateResponse::new(usize::from(removed))))
}

/// Handler for GET /history
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Snapshot<ClimateHistory>>> {
    let params = query.to_params()?;
    let subscription = state.service.climate_history(params).await?;
    Ok(Json(read(subscription, query.wait).await?))
}

/// Handler for GET /global-stats
pub async fn global_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<Snapshot<GlobalStats>>> {
    let subscription = state.service.global_stats().await;
    Ok(Json(read(subscription, query.wait).await?))
}

/// Handler for DELETE /cache
///
/// Invalidates every query in every cache.
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    Json(InvalidateResponse::new(state.service.invalidate_all().await))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
