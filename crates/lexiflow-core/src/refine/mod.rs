//! Content refinement: prompt construction, output schemas, and the
//! validating generation loop.

pub mod prompt;
pub mod refiner;
pub mod schema;

pub use prompt::RefineRequest;
pub use refiner::ContentRefiner;

use lexiflow_types::llm::LlmError;

/// Errors from a refinement call.
#[derive(Debug, thiserror::Error)]
pub enum RefinementError {
    /// The model never produced a valid response. Terminal.
    #[error("generation output failed validation after {attempts} attempts: {reason}")]
    Schema { attempts: u32, reason: String },

    /// The provider failed permanently or kept failing after backoff.
    #[error("generation provider failed: {0}")]
    Provider(LlmError),
}

impl RefinementError {
    /// True when the provider was unreachable rather than wrong.
    pub fn is_transient(&self) -> bool {
        matches!(self, RefinementError::Provider(e) if e.is_transient())
    }
}
