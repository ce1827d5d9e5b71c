//! Liveness routes
//!
//! GET /       - plain-text banner with the server's current time
//! GET /health - static JSON for checkers that want structure

use axum::{routing::get, Json, Router};
use chrono::Local;
use serde::Serialize;

const PREFIX: &str = "Server is running with Time: ";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

async fn liveness() -> String {
    format!("{}{}!", PREFIX, Local::now().to_rfc3339())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "achievementd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
}
