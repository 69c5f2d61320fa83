//! # Business Logic Services
//!
//! Domain services used by the HTTP handlers.
//!
//! ## Available Services
//!
//! - **Email** (`email`) - Outbound mail delivery with pluggable implementations
//! - **JWT** (`jwt`) - Access token signing and validation
//! - **Password** (`password`) - Argon2 credential hashing and verification

pub mod email;
pub mod jwt;
pub mod password;
