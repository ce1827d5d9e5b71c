//! Database layer - connection pool and the procedure store
//!
//! - One pool per process, built by the entry point and passed down
//! - Every job borrows exactly one connection and returns it on drop
//! - Errors collapse into a single `DbError` kind

pub mod pool;
pub mod store;

pub use pool::create_pool;
pub use store::{DbError, MockStore, PgProcedureStore, ProcedureStore};
