// ABOUTME: JWT-based user authentication for the Repforge API
// ABOUTME: Handles token generation, detailed validation, and bcrypt password hashing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Authentication
//!
//! Tokens are HS256 JWTs signed with the configured secret. The subject is the
//! numeric user id. Validation failures are classified so handlers can tell an
//! expired session apart from a forged or truncated token.

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use repforge_core::errors::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Convert a duration to a human-readable format
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => write!(
                f,
                "JWT token expired {} ago at {}",
                humanize_duration(current_time.signed_duration_since(*expired_at)),
                expired_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::TokenInvalid { reason } => write!(f, "JWT token signature is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl StdError for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        let code = match error {
            JwtValidationError::TokenExpired { .. } => ErrorCode::AuthExpired,
            JwtValidationError::TokenInvalid { .. } => ErrorCode::AuthInvalid,
            JwtValidationError::TokenMalformed { .. } => ErrorCode::AuthMalformed,
        };
        Self::new(code, error.to_string())
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token ID, unique per issued token
    #[serde(default)]
    pub jti: Option<String>,
}

impl Claims {
    /// Numeric user id carried in `sub`
    ///
    /// # Errors
    ///
    /// Returns a malformed-token error if the subject is not an integer
    pub fn user_id(&self) -> Result<i64, JwtValidationError> {
        self.sub
            .parse()
            .map_err(|_| JwtValidationError::TokenMalformed {
                details: format!("Token subject is not a user id: {}", self.sub),
            })
    }
}

/// Authentication manager for `JWT` tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a new authentication manager from an HS256 secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Configured token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user_id: i64, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token with detailed error information
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, carries a bad
    /// signature, or is not a well-formed JWT
    pub fn validate_token_detailed(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        Self::check_token_expiry(&claims, Utc::now())?;
        debug!(user_id = %claims.sub, "JWT token validation successful");
        Ok(claims)
    }

    /// Check if token is expired and return error if so
    fn check_token_expiry(
        claims: &Claims,
        current_time: DateTime<Utc>,
    ) -> Result<(), JwtValidationError> {
        if current_time.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(current_time);
            warn!(
                user_id = %claims.sub,
                "JWT token expired {} ago",
                humanize_duration(current_time.signed_duration_since(expired_at))
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &JwtError) -> JwtValidationError {
        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    // ========================================================================
    // Passwords
    // ========================================================================

    /// Hash a password with bcrypt at the configured cost, off the async executor
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task is lost
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Check a password against a stored bcrypt hash, off the async executor
    ///
    /// A corrupt stored hash counts as a mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking task is lost
    pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?;
        Ok(verified.unwrap_or_else(|e| {
            warn!("Stored password hash could not be verified: {e}");
            false
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret-with-enough-bytes!!";

    #[test]
    fn test_token_round_trip_subject() {
        let manager = AuthManager::new(SECRET, 12);
        let token = manager.generate_token(42, "ada@example.com").unwrap();
        let claims = manager.validate_token_detailed(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[test]
    fn test_expired_token_is_classified() {
        let manager = AuthManager::new(SECRET, -1);
        let token = manager.generate_token(1, "late@example.com").unwrap();
        let err = manager.validate_token_detailed(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));
        assert_eq!(AppError::from(err).code, ErrorCode::AuthExpired);
    }

    #[test]
    fn test_foreign_signature_is_invalid() {
        let issuer = AuthManager::new(b"another-secret-of-sufficient-length", 12);
        let verifier = AuthManager::new(SECRET, 12);
        let token = issuer.generate_token(1, "x@example.com").unwrap();
        assert!(matches!(
            verifier.validate_token_detailed(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let manager = AuthManager::new(SECRET, 12);
        assert!(matches!(
            manager.validate_token_detailed("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_password_hash_verifies() {
        let manager = AuthManager::new(SECRET, 12).with_bcrypt_cost(4);
        let hash = manager.hash_password("correct horse").await.unwrap();
        assert!(AuthManager::verify_password("correct horse", &hash).await.unwrap());
        assert!(!AuthManager::verify_password("wrong horse", &hash).await.unwrap());
        assert!(!AuthManager::verify_password("anything", "not-a-bcrypt-hash")
            .await
            .unwrap());
    }
}
