//! GET /status - in-memory run statistics
//!
//! Counts and last outcome per job since process start. Nothing here
//! survives a restart.

use axum::{extract::State, routing::get, Json, Router};

use crate::state::AppState;
use crate::stats::StatsSnapshot;

async fn status(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.runner().stats().snapshot())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}
