//! achievementd-server: scheduled runner for the achievement update procedure
//!
//! Calls `public.update_achievements()` on a cron cadence and exposes
//! fire-and-forget HTTP triggers for the procedure and a connectivity
//! check. The pool is built once by the entry point and handed down.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod job;
pub mod runner;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod stats;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ServerError, ServerResult};
pub use job::{Job, RunOutcome, RunReport, Trigger};
pub use service::{run_once, run_service};
pub use state::AppState;
