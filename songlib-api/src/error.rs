//! Error types for songlib-api
//!
//! Each variant maps to one HTTP status and one fixed, generic message. The
//! underlying cause is logged where the error is raised and never returned to
//! the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Path id is not a positive integer (400)
    #[error("Invalid song ID")]
    InvalidSongId,

    /// Malformed or incomplete request body (400)
    #[error("Invalid data format")]
    InvalidData,

    /// No song with the requested id (404)
    #[error("Song is not found")]
    NotFound,

    /// Metadata service unreachable or answered non-success (400)
    #[error("Couldn't get song info")]
    LookupFailed,

    /// Metadata service answered with an undecodable body (500)
    #[error("Song info processing error")]
    LookupDecode,

    /// Any storage failure (500)
    #[error("Database error")]
    Database,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidSongId | ApiError::InvalidData | ApiError::LookupFailed => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::LookupDecode | ApiError::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
