//! Engine Module
//!
//! Stateless synthetic generators: yearly projections, monthly history and
//! headline statistics. All randomness comes from an injected [`NoiseSource`].

mod global_stats;
mod history;
mod noise;
mod params;
mod projection;


// Re-export public types
pub use global_stats::{generate_global_stats, GlobalStats, GLOBAL_STATS_KEY};
pub use history::{generate_history, ClimateHistory, HistoryParams, MonthlyRecord, HISTORY_END_YEAR};
pub use noise::{NoNoise, NoisePolicy, NoiseSource, SeededNoise};
pub use params::{
    confidence_width, Category, ClimateModel, Parameters, Region, Scenario, TimeRange,
    CONFIDENCE_STEP, MAX_CONFIDENCE, MIN_CONFIDENCE,
};
pub use projection::{
    anomaly_trend, uncertainty_range, ProjectionEngine, ProjectionPoint, ProjectionSeries,
};
