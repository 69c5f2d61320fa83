//! # Appointment Records
//!
//! Row types and query functions for the appointments table. An appointment
//! is never physically deleted; cancellation sets `canceled_at` and the slot
//! becomes available again.
//!
//! Slot uniqueness is enforced twice: a pre-insert availability check gives
//! the friendly error message, and a partial unique index on
//! `(provider_id, date) WHERE canceled_at IS NULL` closes the window between
//! two concurrent availability checks.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::utils::constant::{APPOINTMENTS_PAGE_SIZE, CANCELLATION_WINDOW};

/// A bare appointment row.
#[derive(Debug, FromRow, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub canceled_at: Option<OffsetDateTime>,
}

impl Appointment {
    /// Whether the appointment's start already lies in the past.
    pub fn past(&self, now: OffsetDateTime) -> bool {
        self.date < now
    }

    /// Whether the appointment can still be canceled.
    ///
    /// Requires an active (non-canceled) appointment whose start is more than
    /// the cancellation window away.
    pub fn cancelable(&self, now: OffsetDateTime) -> bool {
        self.canceled_at.is_none() && now < self.date - CANCELLATION_WINDOW
    }

    /// Checks whether an active appointment already occupies the slot.
    pub async fn slot_taken(
        pool: &PgPool,
        provider_id: Uuid,
        date: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM appointments
            WHERE provider_id = $1 AND date = $2 AND canceled_at IS NULL
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Inserts a new appointment for the slot.
    ///
    /// The partial unique index rejects a second active appointment for the
    /// same slot; callers translate that unique violation into the same
    /// "slot unavailable" answer as the pre-check.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        provider_id: Uuid,
        date: OffsetDateTime,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO appointments (user_id, provider_id, date)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, provider_id, date, canceled_at
            "#,
        )
        .bind(user_id)
        .bind(provider_id)
        .bind(date)
        .fetch_one(pool)
        .await
    }

    /// Marks the appointment as canceled and returns the updated row.
    pub async fn cancel(
        pool: &PgPool,
        id: Uuid,
        canceled_at: OffsetDateTime,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE appointments SET canceled_at = $2
            WHERE id = $1
            RETURNING id, user_id, provider_id, date, canceled_at
            "#,
        )
        .bind(id)
        .bind(canceled_at)
        .fetch_one(pool)
        .await
    }
}

/// Listing row: an active appointment with its provider and the provider's
/// avatar left-joined in.
#[derive(Debug, FromRow)]
pub struct AppointmentListRow {
    pub id: Uuid,
    pub date: OffsetDateTime,
    pub provider_id: Uuid,
    pub provider_name: String,
    pub avatar_id: Option<Uuid>,
    pub avatar_path: Option<String>,
    pub avatar_url: Option<String>,
}

impl AppointmentListRow {
    /// Fetches one page of the caller's active appointments, soonest first.
    pub async fn page_for_user(
        pool: &PgPool,
        user_id: Uuid,
        page: u32,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let offset = (page.max(1) as i64 - 1) * APPOINTMENTS_PAGE_SIZE;

        sqlx::query_as::<_, Self>(
            r#"
            SELECT a.id, a.date,
                   p.id AS provider_id, p.name AS provider_name,
                   f.id AS avatar_id, f.path AS avatar_path, f.url AS avatar_url
            FROM appointments a
            JOIN users p ON p.id = a.provider_id
            LEFT JOIN files f ON f.id = p.avatar_id
            WHERE a.user_id = $1 AND a.canceled_at IS NULL
            ORDER BY a.date ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(APPOINTMENTS_PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

/// Cancellation row: the appointment joined with the names needed for the
/// ownership check and the cancellation email.
#[derive(Debug, FromRow)]
pub struct AppointmentForCancellation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub date: OffsetDateTime,
    pub canceled_at: Option<OffsetDateTime>,
    pub provider_name: String,
    pub provider_email: String,
    pub user_name: String,
}

impl AppointmentForCancellation {
    /// Loads an appointment with provider (name, email) and booker (name).
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT a.id, a.user_id, a.provider_id, a.date, a.canceled_at,
                   p.name AS provider_name, p.email AS provider_email,
                   u.name AS user_name
            FROM appointments a
            JOIN users p ON p.id = a.provider_id
            JOIN users u ON u.id = a.user_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
