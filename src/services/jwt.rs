//! # JWT Service
//!
//! This module provides JSON Web Token functionality for session
//! authentication. The session endpoint signs a token binding the user's id;
//! the auth middleware validates it on every protected request.
//!
//! Tokens are stateless HS256 with a configurable expiry. There is no
//! server-side session record to revoke; expiry is the only invalidation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// Errors that can occur during JWT operations
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// JWT claims structure for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as string)
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Service for signing and validating access tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    /// Creates a new JWT service.
    ///
    /// # Arguments
    ///
    /// * `encoding_key` - Key used for signing tokens
    /// * `decoding_key` - Key used for verifying tokens
    /// * `expiry` - Lifetime granted to each issued token
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey, expiry: Duration) -> Self {
        Self {
            encoding_key,
            decoding_key,
            expiry,
        }
    }

    /// Signs an access token for the given user.
    ///
    /// The token carries the user id as `sub` and expires `expiry` after
    /// issuance.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    #[instrument(skip(self))]
    pub fn sign_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        trace!("Signing access token");

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System time should not be before UNIX EPOCH")
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.expiry.as_secs(),
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validates an access token and returns its claims.
    ///
    /// Verifies the signature and expiration; no database lookup is involved.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        trace!("Validating access token");

        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(user_id = %token_data.claims.sub, "Access token validated successfully");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Access token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid access token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(expiry: Duration) -> JwtService {
        let secret = b"test-secret-for-jwt-unit-tests";
        JwtService::new(
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
            expiry,
        )
    }

    #[test]
    fn signed_token_round_trips_user_id() {
        let service = test_service(Duration::from_secs(3600));
        let user_id = Uuid::new_v4();

        let token = service.sign_token(user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let service = test_service(Duration::from_secs(3600));
        let other = JwtService::new(
            EncodingKey::from_secret(b"a-different-secret"),
            DecodingKey::from_secret(b"a-different-secret"),
            Duration::from_secs(3600),
        );

        let token = other.sign_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_service(Duration::from_secs(3600));
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Expired beyond the default 60s validation leeway
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: now - 120,
            iat: now - 240,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-for-jwt-unit-tests"),
        )
        .unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = test_service(Duration::from_secs(3600));
        assert!(matches!(
            service.validate_access_token("not-a-jwt"),
            Err(JwtError::InvalidToken)
        ));
    }
}
