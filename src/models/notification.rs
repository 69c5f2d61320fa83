//! # Notification Log
//!
//! Append-only in-app notifications. Booking writes one entry addressed to
//! the provider; nothing in this service reads them back.

use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

impl Notification {
    /// Appends a notification addressed to `user_id`.
    pub async fn create(
        pool: &PgPool,
        content: &str,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (content, user_id)
            VALUES ($1, $2)
            RETURNING id, content, user_id, read, created_at
            "#,
        )
        .bind(content)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
