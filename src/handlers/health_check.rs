//! # Health Check Handler
//!
//! Simple health check endpoint for monitoring application availability.

use axum::http::StatusCode;
use tracing::{debug, instrument};

/// Health check endpoint that returns 200 OK.
///
/// Performs no database checks; it only indicates that the process is up and
/// answering HTTP requests.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check endpoint accessed");
    StatusCode::OK
}
