//! Member registration.
//!
//! Exposed both as `POST /register/register` and `POST /member`; both paths
//! share one handler.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::NewUser;
use crate::state::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/register/register", post(register))
}

/// Request body for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    // ---
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: &'static str,
    pub user: NewUser,
}

pub(crate) async fn register(
    State(state): State<AppState>,
    AppJson(mut input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    // ---
    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_lowercase();

    check_request(&input, state.config.min_password_len as usize)?;

    if db::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let hash = hash_password(&input.password)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {e}")))?;

    // The unique constraint still guards concurrent sign-ups (mapped to 409).
    let user = db::insert_user(&state.pool, &input.name, &input.email, &hash).await?;
    info!(email = %user.email, "New member registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: "Registration successful",
            user,
        }),
    ))
}

/// Field validation that does not need the database.
fn check_request(input: &RegisterRequest, min_password_len: usize) -> AppResult<()> {
    // ---
    if let Err(errors) = input.validate() {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::Validation(message));
    }

    validate_password_strength(&input.password, min_password_len).map_err(AppError::Validation)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(check_request(&request("Somchai", "somchai@farm.test", "secret1"), 6).is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        // ---
        let err = check_request(&request("Somchai", "somchai@farm.test", "abc"), 6).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("at least 6")));
    }

    #[test]
    fn test_rejects_missing_name_and_bad_email() {
        // ---
        let err = check_request(&request("", "not-an-email", "secret1"), 6).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("Name is required"), "{msg}");
                assert!(msg.contains("valid email"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
