//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! Every failure a handler can produce is expressed as an [`AppError`] variant
//! and converted into the API's `{"error": <message>}` response shape in one
//! place.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Central application error type that encompasses all possible error conditions.
///
/// Business-rule violations carry their user-facing (pt-BR) message directly.
/// _Db errors are logged automatically with full detail but never leak it to
/// the caller._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            // Log detailed database errors for internal tracking
            error!(?e, "Database error occurred");
        }

        let (status, message) = match self {
            AppError::Db(_) | AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor")
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorBody { error: message });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
