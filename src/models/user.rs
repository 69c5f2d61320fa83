//! # User Projections
//!
//! Read-only user lookups. Accounts are created by the signup flow outside
//! this service; here users only appear as the session principal or as a
//! booking target.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Avatar file reference as exposed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct Avatar {
    pub id: Uuid,
    pub path: String,
    pub url: String,
}

/// A user row joined with its optional avatar file.
///
/// Carries the password hash for verification by the session endpoint; the
/// hash must never be serialized back to a caller, which is why this type is
/// not `Serialize` and handlers build explicit response projections instead.
#[derive(Debug, FromRow)]
pub struct UserWithAvatar {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub provider: bool,
    pub avatar_id: Option<Uuid>,
    pub avatar_path: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserWithAvatar {
    /// Looks up a user by email, with the avatar file left-joined in.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.phone, u.provider,
                   f.id AS avatar_id, f.path AS avatar_path, f.url AS avatar_url
            FROM users u
            LEFT JOIN files f ON f.id = u.avatar_id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Assembles the avatar projection when all file columns are present.
    pub fn avatar(&self) -> Option<Avatar> {
        match (&self.avatar_id, &self.avatar_path, &self.avatar_url) {
            (Some(id), Some(path), Some(url)) => Some(Avatar {
                id: *id,
                path: path.clone(),
                url: url.clone(),
            }),
            _ => None,
        }
    }
}

/// Checks that a user exists and is flagged as a bookable provider.
pub async fn is_provider(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND provider = TRUE")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Fetches a user's display name.
pub async fn user_name(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
