//! Cache Module
//!
//! Keyed async query cache with single-flight fetches, per-key status
//! tracking and explicit invalidation.

mod entry;
mod observer;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, QueryStatus};
pub use observer::QueryObserver;
pub use stats::CacheStats;
pub use store::{QueryCache, Snapshot, Subscription};
