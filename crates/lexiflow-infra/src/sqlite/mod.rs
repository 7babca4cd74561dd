//! SQLite storage layer.
//!
//! Run repository backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod pool;
pub mod run;

pub use pool::DatabasePool;
pub use run::SqliteRunRepository;
