//! Error types for achievementd-server
//!
//! Job failures never show up here: the runner turns them into
//! `RunOutcome::Failed`. These are startup and serve-loop errors only.

use std::net::SocketAddr;

use thiserror::Error;

use crate::scheduler::ScheduleError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
