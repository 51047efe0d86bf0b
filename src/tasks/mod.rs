//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Query GC: Removes settled queries that nobody has observed for a while

mod cleanup;

pub use cleanup::spawn_gc_task;
