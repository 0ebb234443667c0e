use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthUser;
use crate::db;
use crate::error::AppResult;
use crate::evaluator::{self, EvaluationResult};
use crate::extract::{AppJson, AppQuery};
use crate::monitor::QualitySnapshot;
use crate::state::AppState;
use crate::WaterReading;

// ---

/// Upper bound for `?limit=`.
const MAX_LIMIT: u32 = 100;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/member/water-quality", get(recent))
        .route("/member/water-quality/evaluation", get(latest_evaluation))
        .route("/member/water-quality/evaluate", post(evaluate))
        .route("/member/water-quality/status", get(status))
}

/// Query parameters for the readings list.
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LatestEvaluation {
    pub reading: Option<WaterReading>,
    pub evaluation: EvaluationResult,
}

/// GET /member/water-quality
///
/// Most recent readings, newest first.
async fn recent(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ReadingsQuery>,
    _user: AuthUser,
) -> AppResult<Json<Vec<WaterReading>>> {
    // ---
    let limit = effective_limit(params.limit, state.config.reading_limit);
    let readings = db::latest_readings(&state.pool, limit).await?;
    debug!("Returning {} readings (limit {})", readings.len(), limit);
    Ok(Json(readings))
}

/// GET /member/water-quality/evaluation
async fn latest_evaluation(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<LatestEvaluation>> {
    // ---
    let reading = db::latest_reading(&state.pool).await?;
    let evaluation = reading
        .as_ref()
        .map(evaluator::evaluate)
        .unwrap_or_else(EvaluationResult::no_data);

    Ok(Json(LatestEvaluation {
        reading,
        evaluation,
    }))
}

/// POST /member/water-quality/evaluate
///
/// Evaluates a reading supplied in the body. Any JSON object is accepted;
/// fields that are missing or not numeric are reported as not evaluated.
async fn evaluate(
    _user: AuthUser,
    AppJson(reading): AppJson<WaterReading>,
) -> Json<EvaluationResult> {
    Json(evaluator::evaluate(&reading))
}

/// GET /member/water-quality/status
///
/// Latest snapshot from the background monitor; `null` before its first tick
/// or when the monitor is disabled.
async fn status(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Json<Option<QualitySnapshot>> {
    let snapshot = state.quality.borrow().clone();
    Json(snapshot)
}

fn effective_limit(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, MAX_LIMIT)
}
