//! End-to-end checks against a running server.
//!
//! Set `BASE_URL` (e.g. `http://localhost:8080`) to enable; without it each
//! test returns early so `cargo test` stays self-contained.

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct WaterReading {
    salinity: Option<f64>,
    ph: Option<f64>,
    dissolved_oxygen: Option<f64>,
    nitrogen: Option<f64>,
    hydrogen_sulfide: Option<f64>,
    bod: Option<f64>,
    temperature: Option<f64>,
    recorded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Evaluation {
    is_suitable: bool,
    issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LatestEvaluation {
    reading: Option<WaterReading>,
    evaluation: Evaluation,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

fn base_url() -> Option<String> {
    match std::env::var("BASE_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("BASE_URL not set; skipping end-to-end test");
            None
        }
    }
}

/// Register a throwaway member and return a bearer token for it.
async fn login_fresh_member(client: &Client, base: &str) -> Result<String> {
    // ---
    let email = format!("e2e-{}@farm.test", Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let password = "pond-water-42";

    let res = client
        .post(format!("{base}/register/register"))
        .json(&json!({ "name": "E2E", "email": email, "password": password }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let dup = client
        .post(format!("{base}/register/register"))
        .json(&json!({ "name": "E2E", "email": email, "password": password }))
        .send()
        .await?;
    assert_eq!(dup.status(), StatusCode::CONFLICT, "duplicate email must be rejected");

    let login: LoginResponse = client
        .post(format!("{base}/member/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(login.token)
}

#[tokio::test]
async fn readings_are_newest_first_and_limited() -> Result<()> {
    // ---
    let Some(base) = base_url() else {
        return Ok(());
    };
    let client = Client::new();
    let token = login_fresh_member(&client, &base).await?;

    let readings: Vec<WaterReading> = client
        .get(format!("{base}/member/water-quality?limit=5"))
        .bearer_auth(&token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    assert!(readings.len() <= 5, "Limit filter failed");
    for pair in readings.windows(2) {
        assert!(
            pair[0].recorded_at >= pair[1].recorded_at,
            "Readings not ordered newest first"
        );
    }

    Ok(())
}

#[tokio::test]
async fn latest_evaluation_matches_thresholds() -> Result<()> {
    // ---
    let Some(base) = base_url() else {
        return Ok(());
    };
    let client = Client::new();
    let token = login_fresh_member(&client, &base).await?;

    let latest: LatestEvaluation = client
        .get(format!("{base}/member/water-quality/evaluation"))
        .bearer_auth(&token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let Some(r) = latest.reading else {
        assert!(!latest.evaluation.is_suitable);
        return Ok(());
    };

    let out = |v: Option<f64>, ok: &dyn Fn(f64) -> bool| v.is_some_and(|v| !ok(v));
    let violations = [
        out(r.salinity, &|v: f64| (5.0..=25.0).contains(&v)),
        out(r.ph, &|v: f64| (7.5..=8.5).contains(&v)),
        out(r.dissolved_oxygen, &|v: f64| v >= 4.0),
        out(r.nitrogen, &|v: f64| v <= 0.1),
        out(r.hydrogen_sulfide, &|v: f64| v <= 0.003),
        out(r.bod, &|v: f64| v <= 20.0),
        out(r.temperature, &|v: f64| (26.0..=32.0).contains(&v)),
    ]
    .iter()
    .filter(|v| **v)
    .count();

    assert_eq!(latest.evaluation.is_suitable, violations == 0);
    if violations > 0 {
        assert_eq!(latest.evaluation.issues.len(), violations);
    } else {
        assert_eq!(latest.evaluation.issues.len(), 1);
    }

    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_token() -> Result<()> {
    // ---
    let Some(base) = base_url() else {
        return Ok(());
    };
    let client = Client::new();

    let res = client.get(format!("{base}/member/water-quality")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{base}/member/water-quality"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{base}/member/login"))
        .json(&json!({ "email": "nobody@farm.test", "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
