//! # Text Input Validation Utilities
//!
//! This module provides validation utilities for user input, currently the
//! email address pattern used by the session endpoint.

use std::sync::LazyLock;

use regex::Regex;

/// Email validation regex pattern
///
/// Checks the general `local@domain.tld` shape. Deliverability is not
/// verified here; a well-formed address that does not exist simply fails the
/// user lookup later.
///
/// # Examples
///
/// - `user@example.com` ✓ Valid
/// - `user.name+tag@sub.example.com` ✓ Valid
/// - `invalid-email` ✗ Invalid format
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Failed to compile email regex")
});
