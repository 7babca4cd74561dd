//! GenerationProvider trait definition.
//!
//! This is the core abstraction that structured-output backends implement.
//! Uses RPITIT for `complete`.

use lexiflow_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for generation backends (Anthropic, test doubles, ...).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// When `request.output_config` carries a JSON schema the provider must
/// either constrain decoding to it or return the raw text for post-hoc
/// validation; callers validate either way.
///
/// Implementations live in lexiflow-infra (e.g., `AnthropicProvider`).
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Model identifier requests should default to.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
