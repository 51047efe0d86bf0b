//! Query GC Task
//!
//! Background task that periodically removes settled queries with no
//! subscribers once they are older than the configured lifetime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::service::ClimateService;

/// Spawns a background task that periodically collects inactive queries.
///
/// # Arguments
/// * `service` - Handle to the caches to sweep
/// * `interval_secs` - Interval in seconds between sweeps
/// * `gc_time_secs` - Minimum age in seconds of a collectable query
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let service = ClimateService::from_config(&Config::default());
/// let gc_handle = spawn_gc_task(service.clone(), 30, 300);
/// // Later, during shutdown:
/// gc_handle.abort();
/// ```
pub fn spawn_gc_task(service: ClimateService, interval_secs: u64, gc_time_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);
    let gc_time = Duration::from_secs(gc_time_secs);

    tokio::spawn(async move {
        info!(
            "Starting query GC task with interval of {} seconds, gc time {} seconds",
            interval_secs, gc_time_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = service.collect_garbage(gc_time).await;

            if removed > 0 {
                info!("Query GC: removed {} inactive queries", removed);
            } else {
                debug!("Query GC: no inactive queries found");
            }
        }
    })
}
