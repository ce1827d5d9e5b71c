//! Axum server setup
//!
//! Server skeleton with:
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::error::ServerError;
use crate::state::AppState;

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::liveness::router())
        .merge(routes::triggers::router())
        .merge(routes::status::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `bind_addr` until `shutdown` resolves.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(runner);
/// run_server(state, config.bind, shutdown_signal()).await?;
/// ```
pub async fn run_server<F>(
    state: AppState,
    bind_addr: SocketAddr,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr,
            source,
        })?;
    tracing::info!("Server is running on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::db::MockStore;
    use crate::http::routes::triggers::{EXECUTE_PROCEDURE_STARTED, TEST_QUERY_STARTED};
    use crate::job::Job;
    use crate::runner::ProcedureRunner;

    fn app(store: Arc<MockStore>) -> (Router, Arc<ProcedureRunner>) {
        let runner = Arc::new(ProcedureRunner::new(store));
        (build_router(AppState::new(runner.clone())), runner)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn wait_for_completed(store: &MockStore, expected: usize) {
        for _ in 0..100 {
            if store.completed() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {} completed jobs, saw {}", expected, store.completed());
    }

    #[tokio::test]
    async fn root_reports_server_time() {
        let (app, _) = app(Arc::new(MockStore::new()));
        let (status, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Server is running with Time: "));
    }

    #[tokio::test]
    async fn test_query_answers_before_slow_job_finishes() {
        let store = Arc::new(MockStore::new().with_delay(Duration::from_secs(2)));
        let (app, _) = app(store.clone());

        let started = Instant::now();
        let (status, body) = get(app, "/testQuery").await;

        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, TEST_QUERY_STARTED);
        assert_eq!(store.completed(), 0);
    }

    #[tokio::test]
    async fn execute_procedure_answers_before_slow_job_finishes() {
        let store = Arc::new(MockStore::new().with_delay(Duration::from_secs(2)));
        let (app, _) = app(store.clone());

        let started = Instant::now();
        let (status, body) = get(app, "/executeProcedure").await;

        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, EXECUTE_PROCEDURE_STARTED);
    }

    #[tokio::test]
    async fn execute_procedure_runs_the_procedure() {
        let store = Arc::new(MockStore::new());
        let (app, _) = app(store.clone());

        get(app, "/executeProcedure").await;
        wait_for_completed(&store, 1).await;

        assert_eq!(store.calls(), vec![Job::Procedure]);
    }

    #[tokio::test]
    async fn test_query_runs_the_health_query() {
        let store = Arc::new(MockStore::new());
        let (app, _) = app(store.clone());

        get(app, "/testQuery").await;
        wait_for_completed(&store, 1).await;

        assert_eq!(store.calls(), vec![Job::HealthQuery]);
    }

    #[tokio::test]
    async fn triggers_acknowledge_even_when_job_fails() {
        let store = Arc::new(MockStore::new().failing());
        let (app, runner) = app(store.clone());

        let (status, _) = get(app, "/executeProcedure").await;
        assert_eq!(status, StatusCode::OK);

        for _ in 0..100 {
            if runner.stats().snapshot().procedure.failures == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("failure was never recorded");
    }

    #[tokio::test]
    async fn status_reports_counts() {
        let store = Arc::new(MockStore::new());
        let (app, runner) = app(store);
        runner.run_procedure(crate::job::Trigger::Cli).await;

        let (status, body) = get(app, "/status").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["procedure"]["runs"], 1);
        assert_eq!(json["procedure"]["last"]["outcome"]["status"], "succeeded");
        assert_eq!(json["health_query"]["runs"], 0);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (app, _) = app(Arc::new(MockStore::new()));
        let (status, _) = get(app, "/startDataSearch").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn run_server_stops_on_shutdown() {
        let runner = Arc::new(ProcedureRunner::new(Arc::new(MockStore::new())));
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));

        tokio::time::timeout(
            Duration::from_secs(2),
            run_server(AppState::new(runner), addr, async {}),
        )
        .await
        .expect("server should shut down")
        .unwrap();
    }
}
