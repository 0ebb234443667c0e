//! Member authentication: password hashing, access tokens and the
//! [`AuthUser`] extractor for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

pub mod jwt;
pub mod password;

// ---

/// Member identity taken from a valid `Authorization: Bearer <token>` header.
///
/// Add it as a handler argument to require a logged-in member. A missing or
/// non-Bearer header is rejected with 401; an invalid or expired token with
/// 403.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    /// Token id, for log correlation.
    pub token_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        // A token was presented: a bad one is 403 so clients know to log in again.
        let claims = jwt::validate_token(token.trim(), &state.config).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::Forbidden("Invalid or expired token".into())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            token_id: claims.jti,
        })
    }
}
