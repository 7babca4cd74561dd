//! Anthropic Claude generation provider.
//!
//! [`AnthropicProvider`] implements
//! [`GenerationProvider`](lexiflow_core::llm::provider::GenerationProvider)
//! against the non-streaming Messages API with structured output.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
