//! # Agenda - Appointment Scheduling Backend
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for sessions and appointments
//! - [`middleware`] - JWT authentication middleware for protected routes
//! - [`models`] - Shared state and persistence row types
//! - [`services`] - Business logic services (email, JWT, passwords)
//! - [`utils`] - Utility functions and constants

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretSlice};
use sqlx::PgPool;
use tracing::info;

use crate::handlers::{
    cancel_appointment, create_appointment, create_session, health_check, list_appointments,
};
use crate::middleware::auth_middleware;
use crate::models::AppState;
use crate::services::email::{EmailService, ExternalEmailer, LogEmailer};
use crate::services::jwt::JwtService;
use crate::utils::constant::DEFAULT_TOKEN_EXPIRY;

/// Creates an Axum router with default email service configuration.
///
/// Convenience wrapper around [`app_with_email_service`] that auto-detects
/// the email implementation from the `APP_ENV` environment variable.
#[inline]
pub fn app(db_pool: PgPool) -> Router {
    app_with_email_service(db_pool, None)
}

/// Creates an Axum router with application routes and state.
///
/// # Arguments
///
/// * `db_pool` - PostgreSQL database connection pool
/// * `email_service` - Optional custom email service. If None, will auto-detect based on APP_ENV
///
/// # Environment Variables
///
/// - `APP_ENV` - "production" uses ExternalEmailer, otherwise uses LogEmailer (mock)
/// - `MAIL_API_URL` - Required in production for external email service
/// - `MAIL_API_KEY` - Required in production for external email service
/// - `SENDER_EMAIL` - Required in production for external email service
/// - `JWT_SECRET` - Required for token signing and validation
/// - `TOKEN_EXPIRY_SECS` - Optional access token lifetime in seconds
pub fn app_with_email_service(
    db_pool: PgPool,
    email_service: Option<Arc<dyn EmailService>>,
) -> Router {
    let email_service: Arc<dyn EmailService> = if let Some(service) = email_service {
        service
    } else {
        let app_env = env::var("APP_ENV")
            .expect("Env variable `APP_ENV` should be set")
            .to_ascii_lowercase();

        if app_env == "production" {
            info!("Running in production mode with [ExternalEmailer]");
            let api_url =
                env::var("MAIL_API_URL").expect("Env variable `MAIL_API_URL` should be set");
            let api_key =
                env::var("MAIL_API_KEY").expect("Env variable `MAIL_API_KEY` should be set");
            let sender =
                env::var("SENDER_EMAIL").expect("Env variable `SENDER_EMAIL` should be set");
            Arc::new(ExternalEmailer::new(api_url, api_key, sender))
        } else {
            info!("Running in development mode with [LogEmailer (Mock)]");
            Arc::new(LogEmailer)
        }
    };

    let jwt_keys = SecretSlice::from(
        env::var("JWT_SECRET")
            .expect("Env variable `JWT_SECRET` should be set")
            .into_bytes(),
    );

    let token_expiry = env::var("TOKEN_EXPIRY_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_EXPIRY);

    let jwt_service = JwtService::new(
        EncodingKey::from_secret(jwt_keys.expose_secret()),
        DecodingKey::from_secret(jwt_keys.expose_secret()),
        token_expiry,
    );

    let state = Arc::new(AppState::new(email_service, db_pool, jwt_service));

    let protected_routes = Router::new()
        .route("/appointments", get(list_appointments))
        .route("/appointments", post(create_appointment))
        .route("/appointments/{id}", delete(cancel_appointment))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new()
        .route("/health-check", get(health_check))
        .route("/sessions", post(create_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
