// src/routes/health.rs
//! Liveness endpoints for the shrimpwatch backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is up, plus the `/` greeting
//! kept for clients that check the root. It follows the Explicit Module
//! Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handlers and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing both routes

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct Greeting {
    message: &'static str,
}

/// Handle `GET /health`.
///
/// Deliberately lightweight: does not touch the database or the monitor.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn index() -> Json<Greeting> {
    Json(Greeting {
        message: "shrimpwatch water-quality service",
    })
}

/// Create a subrouter containing `/` and `/health`.
///
/// Generic over the application state so it merges cleanly with the gateway
/// router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}
