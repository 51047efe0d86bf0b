//! API Module
//!
//! HTTP adapter that lets a dashboard read query state as JSON.
//!
//! # Endpoints
//! - `GET /projections` - Projection entry for the query-string parameters
//! - `DELETE /projections` - Invalidate that projection
//! - `GET /history` - Monthly climate history entry
//! - `GET /global-stats` - Headline statistics entry
//! - `DELETE /cache` - Invalidate every query
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
