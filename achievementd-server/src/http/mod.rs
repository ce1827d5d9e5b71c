//! HTTP layer
//!
//! Axum server with:
//! - Liveness and manual trigger routes
//! - JSON health and run statistics
//! - Request tracing
//! - Graceful shutdown

pub mod routes;
pub mod server;

pub use server::{build_router, run_server, shutdown_signal};
