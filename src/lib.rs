//! Climate Projections - parameterized climate projection engine
//!
//! Generates synthetic projection series, monthly climate history and
//! headline statistics, each served through a keyed single-flight query
//! cache that deduplicates concurrent requests.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::ClimateService;
pub use tasks::spawn_gc_task;
