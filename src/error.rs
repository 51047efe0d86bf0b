//! Error types for the projection service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

// == Projection Error Enum ==
/// Unified error type for generators, caches and the HTTP adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// A parameter is outside the recognized set or range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The generator failed unexpectedly
    #[error("Generation failed: {0}")]
    Generation(String),
}

impl ProjectionError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjectionError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ProjectionError::Generation(_) => ErrorKind::Generation,
        }
    }
}

impl From<serde_json::Error> for ProjectionError {
    fn from(err: serde_json::Error) -> Self {
        ProjectionError::Generation(format!("key serialization failed: {}", err))
    }
}

impl From<std::num::ParseIntError> for ProjectionError {
    fn from(err: std::num::ParseIntError) -> Self {
        ProjectionError::InvalidParameter(format!("not a whole number: {}", err))
    }
}

// == Error Info ==
/// Classification of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameter,
    Generation,
}

/// Serializable error snapshot stored in a settled cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ProjectionError> for ErrorInfo {
    fn from(err: &ProjectionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProjectionError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProjectionError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ProjectionError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the projection service.
pub type Result<T> = std::result::Result<T, ProjectionError>;
