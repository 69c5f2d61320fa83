use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::services::{email::EmailService, jwt::JwtService};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// The email service used to send cancellation notices.
    pub email_service: Arc<dyn EmailService>,
    /// The PostgreSQL database connection pool.
    pub db_pool: PgPool,
    /// JWT service for token signing and validation.
    pub jwt_service: JwtService,
}

impl AppState {
    /// Creates a new application state with the provided services.
    pub fn new(email_service: Arc<dyn EmailService>, db_pool: PgPool, jwt_service: JwtService) -> Self {
        info!("Initializing application state");

        Self {
            email_service,
            db_pool,
            jwt_service,
        }
    }
}
