// ABOUTME: Bearer JWT authentication extractor for protected API routes
// ABOUTME: Resolves the caller's user id and checks legacy user_id parameters against it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use repforge_core::errors::{AppError, AppResult};
use tracing::{warn, Span};

use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// The authenticated caller of a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User id from the token subject
    pub user_id: i64,
    /// Email claim
    pub email: String,
}

impl AuthUser {
    /// Check a legacy `user_id` parameter against the token subject
    ///
    /// Absent parameters are filled in from the token.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the parameter names another user
    pub fn ensure_matches(&self, legacy_user_id: Option<i64>) -> AppResult<i64> {
        match legacy_user_id {
            Some(requested) if requested != self.user_id => {
                warn!(
                    user_id = self.user_id,
                    requested, "Rejected request for another user's data"
                );
                Err(AppError::permission_denied(
                    "user_id does not match the authenticated user",
                )
                .with_user_id(self.user_id))
            }
            _ => Ok(self.user_id),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<ServerResources>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppLogger::log_auth_event(None, "bearer_token", false, Some("missing header"));
                    AppError::auth_required()
                })?;

        let resources = Arc::<ServerResources>::from_ref(state);
        let claims = resources
            .auth
            .validate_token_detailed(bearer.token())
            .map_err(|e| {
                AppLogger::log_auth_event(None, "bearer_token", false, Some(&e.to_string()));
                AppError::from(e)
            })?;
        let user_id = claims.user_id()?;

        Span::current().record("user_id", user_id);
        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use repforge_core::errors::ErrorCode;

    use super::*;

    fn caller() -> AuthUser {
        AuthUser {
            user_id: 7,
            email: "seven@example.com".to_owned(),
        }
    }

    #[test]
    fn test_missing_legacy_id_defaults_to_subject() {
        assert_eq!(caller().ensure_matches(None).unwrap(), 7);
        assert_eq!(caller().ensure_matches(Some(7)).unwrap(), 7);
    }

    #[test]
    fn test_foreign_legacy_id_is_forbidden() {
        let err = caller().ensure_matches(Some(8)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.http_status(), 403);
    }
}
