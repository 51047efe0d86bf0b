//! Request and Response models for the projection API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query strings and serializing response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{HistoryQuery, ProjectionQuery, WaitQuery};
pub use responses::{CacheStatsResponse, HealthResponse, InvalidateResponse, StatsResponse};
