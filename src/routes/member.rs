//! `/member` account endpoints: login, logout, profile and login history.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::auth::AuthUser;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{LoginLog, UserProfile};
use crate::state::AppState;

use super::register::register;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/member", get(profile).post(register))
        .route("/member/login", post(login))
        .route("/member/logout", post(logout))
        .route("/member/login-logs", get(login_logs))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

/// POST /member/login
///
/// Verifies credentials, records an `online` login row and returns a token.
async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    // ---
    let email = input.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let user = db::find_user_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let valid = verify_password(&input.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verification error: {e}")))?;
    if !valid {
        warn!(email = %email, "Failed login attempt");
        return Err(invalid());
    }

    let token = generate_token(&user, &state.config)
        .map_err(|e| AppError::Internal(format!("Token generation error: {e}")))?;

    db::record_login(&state.pool, &user.email).await?;
    info!(user_id = user.id, "Member logged in");

    Ok(Json(LoginResponse {
        msg: "Login successful",
        token,
    }))
}

/// POST /member/logout
///
/// Marks the member's latest login row `offline`. Tokens are stateless and
/// stay valid until they expire.
async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<MessageResponse>> {
    // ---
    let touched = db::record_logout(&state.pool, &user.email).await?;
    if touched == 0 {
        warn!(user_id = user.user_id, "Logout without a recorded login");
    }
    info!(user_id = user.user_id, name = %user.name, jti = %user.token_id, "Member logged out");

    Ok(Json(MessageResponse {
        msg: "Logout successful",
    }))
}

/// GET /member
async fn profile(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserProfile>> {
    // ---
    db::find_profile(&state.pool, user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))
}

/// GET /member/login-logs
async fn login_logs(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<LoginLog>>> {
    // ---
    Ok(Json(db::login_logs(&state.pool, &user.email).await?))
}
