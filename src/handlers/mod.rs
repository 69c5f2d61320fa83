//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the application.
//!
//! ## Available Handlers
//!
//! - **Appointments** (`appointments`) - Listing, booking and cancellation
//! - **Sessions** (`sessions`) - Email/password authentication
//! - **Health Check** (`health_check`) - Application health monitoring

mod appointments;
mod health_check;
mod sessions;

pub use appointments::*;
pub use health_check::*;
pub use sessions::*;
