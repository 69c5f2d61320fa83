//! # Utility Functions and Constants
//!
//! Shared helpers with no business state of their own: configuration
//! constants, input validation patterns and date formatting.

pub mod constant;
pub mod date;
pub mod validator;
