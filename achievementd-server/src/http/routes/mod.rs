//! Route handlers

pub mod liveness;
pub mod status;
pub mod triggers;
