//! # Appointment Handlers
//!
//! This module implements the appointment endpoints: listing a user's
//! upcoming appointments, booking a provider's slot and canceling a booking.
//!
//! Booking granularity is one hour: the requested timestamp is truncated down
//! to `:00` before every check, so two requests inside the same hour compete
//! for the same slot.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    Appointment, AppointmentForCancellation, AppointmentListRow, AppState, Avatar, Notification,
    is_provider, user_name,
};
use crate::services::email::EmailMessage;
use crate::utils::constant::CANCELLATION_WINDOW;
use crate::utils::date::{format_pt, start_of_hour};

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}
fn default_page() -> u32 {
    1
}

/// Provider projection inside a listing item
#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<Avatar>,
}

/// Listing item: an upcoming appointment with its provider joined in
#[derive(Debug, Serialize)]
pub struct AppointmentView {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub past: bool,
    pub cancelable: bool,
    pub provider: ProviderView,
}

/// Full appointment record returned by the booking and cancellation endpoints
#[derive(Debug, Serialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub canceled_at: Option<OffsetDateTime>,
    pub past: bool,
    pub cancelable: bool,
}

impl AppointmentRecord {
    fn from_row(appointment: Appointment, now: OffsetDateTime) -> Self {
        Self {
            past: appointment.past(now),
            cancelable: appointment.cancelable(now),
            id: appointment.id,
            user_id: appointment.user_id,
            provider_id: appointment.provider_id,
            date: appointment.date,
            canceled_at: appointment.canceled_at,
        }
    }
}

/// Request payload for booking an appointment
///
/// Both fields are optional at the serde level, and the handler accepts the
/// extractor's `Result`, so a missing field, a wrong-typed field and an
/// unparseable body all answer the same schema-validation error instead of a
/// bare deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub provider_id: Option<Uuid>,
    pub date: Option<String>,
}

/// Lists the caller's upcoming appointments.
///
/// GET /appointments?page=N
///
/// Non-canceled appointments only, ordered by date ascending, 20 per page.
///
/// # Returns
///
/// - `200 OK` with an array of [`AppointmentView`]
/// - `401 Unauthorized` - Missing or invalid authentication token
/// - `500 Internal Server Error` - Database error
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        page = pagination.page,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<Vec<AppointmentView>>> {
    debug!("Processing appointment listing request");

    let rows = AppointmentListRow::page_for_user(&state.db_pool, user.user_id, pagination.page)
        .await?;
    let now = OffsetDateTime::now_utc();

    let appointments = rows
        .into_iter()
        .map(|row| {
            let avatar = match (&row.avatar_id, &row.avatar_path, &row.avatar_url) {
                (Some(id), Some(path), Some(url)) => Some(Avatar {
                    id: *id,
                    path: path.clone(),
                    url: url.clone(),
                }),
                _ => None,
            };
            AppointmentView {
                id: row.id,
                date: row.date,
                past: row.date < now,
                cancelable: now < row.date - CANCELLATION_WINDOW,
                provider: ProviderView {
                    id: row.provider_id,
                    name: row.provider_name,
                    avatar,
                },
            }
        })
        .collect();

    Ok(Json(appointments))
}

/// Books an appointment with a provider.
///
/// POST /appointments `{provider_id, date}`
///
/// The validation pipeline short-circuits on the first failure: schema,
/// self-booking, provider existence, past date, slot availability. On success
/// the provider receives an in-app notification naming the booker and the
/// formatted date.
///
/// # Returns
///
/// - `200 OK` with the created [`AppointmentRecord`]
/// - `400 Bad Request` - Schema failure, past date or occupied slot
/// - `401 Unauthorized` - Self-booking or target is not a provider
/// - `500 Internal Server Error` - Database error
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> AppResult<Json<AppointmentRecord>> {
    debug!("Processing appointment booking request");

    // 1. Schema check
    let Ok(Json(payload)) = payload else {
        warn!("Booking payload failed to deserialize");
        return Err(AppError::Validation("Validation fails"));
    };
    let (Some(provider_id), Some(date)) = (payload.provider_id, payload.date.as_deref()) else {
        warn!("Booking payload missing required fields");
        return Err(AppError::Validation("Validation fails"));
    };
    let Ok(date) = OffsetDateTime::parse(date, &Rfc3339) else {
        warn!("Booking payload carries an unparseable date");
        return Err(AppError::Validation("Validation fails"));
    };

    // 2. Self-booking guard
    if provider_id == user.user_id {
        warn!("User attempted to book themselves");
        return Err(AppError::Unauthorized(
            "Você não pode criar compromissos consigo mesmo",
        ));
    }

    // 3. Target must be a provider
    if !is_provider(&state.db_pool, provider_id).await? {
        warn!(%provider_id, "Booking target is not a provider");
        return Err(AppError::Unauthorized(
            "Você só pode criar compromissos com provedores",
        ));
    }

    // 4. The slot's hour must not lie in the past
    let hour_start = start_of_hour(date);
    let now = OffsetDateTime::now_utc();
    if hour_start < now {
        warn!(%hour_start, "Requested slot is in the past");
        return Err(AppError::Validation("Data anterior não é permitida"));
    }

    // 5. The slot must be free
    if Appointment::slot_taken(&state.db_pool, provider_id, hour_start).await? {
        warn!(%provider_id, %hour_start, "Slot already booked");
        return Err(AppError::Validation(
            "A data do agendamento não está disponível",
        ));
    }

    // 6. Insert; the partial unique index catches a concurrent booking that
    //    slipped past the availability check
    let appointment =
        match Appointment::create(&state.db_pool, user.user_id, provider_id, hour_start).await {
            Ok(appointment) => appointment,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!(%provider_id, %hour_start, "Slot lost to a concurrent booking");
                return Err(AppError::Validation(
                    "A data do agendamento não está disponível",
                ));
            }
            Err(e) => return Err(e.into()),
        };

    // 7. Notify the provider
    let booker_name = user_name(&state.db_pool, user.user_id)
        .await?
        .ok_or_else(|| {
            error!("Authenticated user vanished from the directory");
            AppError::Internal
        })?;
    let content = format!(
        "Novo agendamento de {booker_name} para o {}",
        format_pt(hour_start)
    );
    Notification::create(&state.db_pool, &content, provider_id).await?;

    info!(appointment_id = %appointment.id, %provider_id, "Appointment booked");
    Ok(Json(AppointmentRecord::from_row(appointment, now)))
}

/// Cancels an appointment.
///
/// DELETE /appointments/{id}
///
/// Only the booking user may cancel, and only while more than six hours
/// remain before the appointment's start. The provider is notified by email;
/// a failed send is logged and never blocks the cancellation.
///
/// # Returns
///
/// - `200 OK` with the updated [`AppointmentRecord`]
/// - `401 Unauthorized` - Caller is not the booker, or the window has closed
/// - `404 Not Found` - No such appointment
/// - `500 Internal Server Error` - Database error
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        appointment_id = %appointment_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> AppResult<Json<AppointmentRecord>> {
    debug!("Processing appointment cancellation request");

    // 1. Load the appointment with provider and booker joined
    let record = AppointmentForCancellation::find(&state.db_pool, appointment_id)
        .await?
        .ok_or(AppError::NotFound("Agendamento não encontrado"))?;

    // 2. Only the booker may cancel
    if record.user_id != user.user_id {
        warn!(owner = %record.user_id, "Cancellation attempted by non-owner");
        return Err(AppError::Unauthorized(
            "Você não tem permissão para cancelar este compromisso.",
        ));
    }

    // 3. The cancellation window must still be open
    let now = OffsetDateTime::now_utc();
    if now >= record.date - CANCELLATION_WINDOW {
        warn!(date = %record.date, "Cancellation window closed");
        return Err(AppError::Unauthorized(
            "Você só pode cancelar o agendamento com 6 horas de antecedência.",
        ));
    }

    // 4. Persist the cancellation
    let appointment = Appointment::cancel(&state.db_pool, appointment_id, now).await?;
    info!("Appointment canceled");

    // 5. Best-effort email to the provider; the cancellation already committed
    let notice = EmailMessage::cancellation_notice(
        &record.provider_name,
        &record.provider_email,
        &record.user_name,
        &format_pt(record.date),
    );
    if let Err(e) = state.email_service.send_email(&notice).await {
        error!(error = %e, "Failed to send cancellation email");
    }

    Ok(Json(AppointmentRecord::from_row(appointment, now)))
}
