//! # Authentication Middleware
//!
//! This module contains the authentication middleware that validates JWT tokens
//! and provides the caller's identity to protected routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, instrument, trace, warn};
use uuid::Uuid;

use crate::models::AppState;

/// Authentication middleware for protecting routes
///
/// Validates the `Bearer <token>` Authorization header and inserts an
/// [`AuthUser`] into request extensions so downstream handlers know who the
/// caller is.
///
/// # Returns
///
/// - **Success**: Continues to next handler with user context
/// - **Failure**: Returns `401 Unauthorized` for invalid/missing tokens
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    trace!("Processing authentication middleware");

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        warn!("Missing Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        warn!("Invalid Authorization header format");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match state.jwt_service.validate_access_token(token) {
        Ok(claims) => {
            let user_id = Uuid::try_parse(&claims.sub).map_err(|e| {
                error!(error = %e, "Failed to parse user ID from token claims");
                StatusCode::UNAUTHORIZED
            })?;

            debug!(user_id = %user_id, "Authentication successful");
            req.extensions_mut().insert(AuthUser { user_id });

            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Authenticated user information available to handlers
///
/// Inserted into request extensions by the authentication middleware and
/// extracted by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// Unique identifier for the authenticated user
    pub user_id: Uuid,
}
