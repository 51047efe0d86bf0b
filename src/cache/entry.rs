//! Cache Entry Module
//!
//! Immutable snapshots of a query's lifecycle. A transition publishes a new
//! snapshot; an existing one is never modified.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ErrorInfo, ProjectionError};

// == Query Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Pending,
    Success,
    Error,
}

impl QueryStatus {
    /// Success and Error are final for an entry.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, QueryStatus::Pending)
    }
}

// == Cache Entry ==
/// Snapshot of one key's state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub key: String,
    pub status: QueryStatus,
    pub value: Option<Arc<T>>,
    pub error: Option<ErrorInfo>,
    /// When the key was first requested
    pub created_at: DateTime<Utc>,
    /// When the entry reached a terminal state
    pub settled_at: Option<DateTime<Utc>>,
}

impl<T> CacheEntry<T> {
    // == Constructors ==
    pub fn pending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: QueryStatus::Pending,
            value: None,
            error: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    /// Builds an entry that settled immediately with `error`.
    pub fn rejected(key: impl Into<String>, error: &ProjectionError) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            status: QueryStatus::Error,
            value: None,
            error: Some(ErrorInfo::from(error)),
            created_at: now,
            settled_at: Some(now),
        }
    }

    // == Transition ==
    /// Returns the terminal successor of this pending snapshot.
    pub fn settle(&self, outcome: Result<T, ProjectionError>) -> Self {
        let (status, value, error) = match outcome {
            Ok(value) => (QueryStatus::Success, Some(Arc::new(value)), None),
            Err(err) => (QueryStatus::Error, None, Some(ErrorInfo::from(&err))),
        };
        Self {
            key: self.key.clone(),
            status,
            value,
            error,
            created_at: self.created_at,
            settled_at: Some(Utc::now()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Age since settling; None while pending.
    pub fn settled_for(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.settled_at.map(|at| now - at)
    }
}

// Manual impl: cloning shares the value and does not require T: Clone.
impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            settled_at: self.settled_at,
        }
    }
}
