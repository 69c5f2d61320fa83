//! # Custom Middleware
//!
//! Cross-cutting request processing. Currently only JWT authentication for
//! the protected appointment routes.

mod auth;

pub use auth::{AuthUser, auth_middleware};
