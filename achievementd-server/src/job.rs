//! Job kinds and run reports

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statement that recomputes user achievements inside the database
pub const PROCEDURE_STATEMENT: &str = "CALL public.update_achievements();";

/// Connectivity check
pub const HEALTH_STATEMENT: &str = "SELECT 1;";

/// The two operations this service knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    /// `CALL public.update_achievements();`
    Procedure,
    /// `SELECT 1;`
    HealthQuery,
}

impl Job {
    pub fn statement(self) -> &'static str {
        match self {
            Self::Procedure => PROCEDURE_STATEMENT,
            Self::HealthQuery => HEALTH_STATEMENT,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procedure => f.write_str("Execute Procedure"),
            Self::HealthQuery => f.write_str("Test Query"),
        }
    }
}

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Schedule,
    Http,
    Cli,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule => f.write_str("schedule"),
            Self::Http => f.write_str("http"),
            Self::Cli => f.write_str("cli"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Result of a single job execution.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub job: Job,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: RunOutcome,
}
