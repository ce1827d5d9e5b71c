//! Manual trigger endpoints
//!
//! Both submit their job to the background and answer immediately; the
//! outcome only shows up in the logs and on `GET /status`.

use axum::{extract::State, routing::get, Router};

use crate::job::{Job, Trigger};
use crate::state::AppState;

pub const TEST_QUERY_STARTED: &str = "Test Query started!";
pub const EXECUTE_PROCEDURE_STARTED: &str = "Execute Procedure started!";

/// GET /testQuery
async fn test_query(State(state): State<AppState>) -> &'static str {
    state.dispatcher().submit(Job::HealthQuery, Trigger::Http);
    TEST_QUERY_STARTED
}

/// GET /executeProcedure
async fn execute_procedure(State(state): State<AppState>) -> &'static str {
    state.dispatcher().submit(Job::Procedure, Trigger::Http);
    EXECUTE_PROCEDURE_STARTED
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testQuery", get(test_query))
        .route("/executeProcedure", get(execute_procedure))
}
