//! # Application Constants
//!
//! This module defines configuration constants used throughout the application.
//! These constants control pagination, booking rules and token lifetimes.

use std::time::Duration;

/// Number of appointments returned per page by the listing endpoint.
pub const APPOINTMENTS_PAGE_SIZE: i64 = 20;

/// Minimum lead time required to cancel an appointment.
///
/// Cancellation is only permitted while the current time is more than this
/// duration before the appointment's start.
pub const CANCELLATION_WINDOW: time::Duration = time::Duration::hours(6);

/// Default expiration time for access tokens.
///
/// Used when the `TOKEN_EXPIRY_SECS` environment variable is not set.
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days
