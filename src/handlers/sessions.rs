//! # Session Handler
//!
//! This module implements email/password authentication. A successful login
//! answers with a sanitized user projection and a signed access token; the
//! stored password hash never appears in any response.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, Avatar, UserWithAvatar};
use crate::services::password;
use crate::utils::validator::EMAIL_REGEX;

/// Request payload for authenticating a user
#[derive(Debug, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(regex(path = "*EMAIL_REGEX"))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Sanitized user projection returned after login
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub avatar: Option<Avatar>,
    pub provider: bool,
}

/// Response containing the user projection and the access token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub token: String,
}

/// Authenticates a user and issues an access token.
///
/// POST /sessions `{email, password}`
///
/// # Returns
///
/// - `200 OK` with [`SessionResponse`] - Credentials accepted
/// - `400 Bad Request` - Unparseable payload, malformed email or missing password
/// - `401 Unauthorized` - Unknown email or password mismatch
/// - `500 Internal Server Error` - Database, hashing or signing failure
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> AppResult<Json<SessionResponse>> {
    debug!("Processing session request");

    // 1. Validate format; a wrong-typed body gets the same answer as a
    //    malformed field
    let Ok(Json(payload)) = payload else {
        warn!("Session payload failed to deserialize");
        return Err(AppError::Validation("Validação falha"));
    };
    if payload.validate().is_err() {
        warn!("Invalid session payload");
        return Err(AppError::Validation("Validação falha"));
    }

    // 2. Look up the user with the avatar joined in
    let user = UserWithAvatar::find_by_email(&state.db_pool, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!("No user registered for email");
            AppError::Unauthorized("Usuário não encontrado")
        })?;

    // 3. Verify the password against the stored hash
    let password_matches =
        password::verify_password(&payload.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Password verification failed to run");
            AppError::Internal
        })?;

    if !password_matches {
        warn!(user_id = %user.id, "Password mismatch");
        return Err(AppError::Unauthorized("Senha não corresponde!"));
    }

    // 4. Issue the access token
    let token = state.jwt_service.sign_token(user.id).map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        AppError::Internal
    })?;

    info!(user_id = %user.id, "Session created");

    let avatar = user.avatar();
    Ok(Json(SessionResponse {
        user: SessionUser {
            id: user.id,
            name: user.name,
            phone: user.phone,
            email: user.email,
            avatar,
            provider: user.provider,
        },
        token,
    }))
}
