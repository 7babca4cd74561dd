use thiserror::Error;

/// Errors from repository operations (used by trait definitions in lexiflow-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    /// Optimistic concurrency check failed: the stored version moved on.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from dictionary provider transport.
///
/// A word that is simply absent is not an error; providers report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited")]
    RateLimited,

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

impl DictionaryError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, DictionaryError::Decode(_))
    }
}
