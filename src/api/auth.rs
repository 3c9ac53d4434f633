//! Admin authentication
//!
//! The manual endpoints (/test, /result) are open unless ADMIN_TOKEN is set.
//! When it is, requests must carry `Authorization: Bearer <token>`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::AppState;

/// Admin guard extractor.
///
/// Add it as the first argument of a handler to protect it:
/// ```ignore
/// async fn my_handler(_admin: AdminGuard) -> impl IntoResponse { /* ... */ }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = match state.config.admin_token.as_deref() {
            Some(token) => token,
            None => return Ok(AdminGuard),
        };

        // Extract Bearer token
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        if token.trim() != expected {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminGuard)
    }
}
