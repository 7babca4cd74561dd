//! Connection pools for the run store.
//!
//! Checkpoint writes from concurrent runs go through one writer connection so
//! SQLite never sees two writers; status polls and run listings use a small
//! read-only pool. The database runs in WAL mode so polls do not block a
//! checkpoint in progress.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "lexiflow.db";

/// Read connections kept open for status polls and listings.
const READER_CONNECTIONS: u32 = 8;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader and writer pools over the same run database.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only; `SELECT`s only.
    pub reader: SqlitePool,
    /// Single connection; every checkpoint goes through it.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the run database and apply the
    /// `workflow_runs` migrations before any reader connects.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(base_opts.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// SQLite URL for the database file inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display())
}
