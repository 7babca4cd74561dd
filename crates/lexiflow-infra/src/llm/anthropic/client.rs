//! AnthropicProvider -- concrete [`GenerationProvider`] for Anthropic Claude.
//!
//! Sends requests to the Messages API (`/v1/messages`) with the request's
//! JSON schema attached as `output_config`, so decoding is constrained
//! server-side. Callers still validate the text they get back.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use lexiflow_core::llm::provider::GenerationProvider;
use lexiflow_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

use super::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse, ErrorPayload};

/// Anthropic Claude generation provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Create a new Anthropic provider.
    ///
    /// `timeout` bounds a single HTTP exchange; step-level deadlines are
    /// enforced by the workflow engine on top of this.
    pub fn new(api_key: SecretString, model: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model,
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`CompletionRequest`] into an [`AnthropicRequest`].
    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| AnthropicMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            messages,
            system: request.system.clone(),
            temperature: request.temperature,
            output_config: request.output_config.clone(),
        }
    }
}

// AnthropicProvider intentionally does NOT derive Debug.

/// Map a non-success HTTP status and body onto an [`LlmError`].
///
/// 429/529 and 5xx are transient; 401/403 and other 4xx are not.
fn classify_error(status: u16, retry_after: Option<&str>, body: &str) -> LlmError {
    let payload = serde_json::from_str::<ErrorPayload>(body).ok();
    let message = payload
        .as_ref()
        .map(|p| p.error.message.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));
    let overloaded = payload
        .as_ref()
        .is_some_and(|p| p.error.error_type == "overloaded_error");

    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000),
        },
        529 => LlmError::Overloaded(message),
        _ if overloaded => LlmError::Overloaded(message),
        400..=499 => LlmError::InvalidRequest(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// Unknown or missing stop reasons count as a normal end of turn.
fn parse_stop_reason(raw: Option<&str>) -> StopReason {
    raw.and_then(|r| r.parse::<StopReason>().ok())
        .unwrap_or(StopReason::EndTurn)
}

impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_anthropic_request(request);
        let url = self.url("/v1/messages");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_body = response.text().await.unwrap_or_default();
            let err = classify_error(status.as_u16(), retry_after.as_deref(), &error_body);
            tracing::warn!(status = status.as_u16(), error = %err, "anthropic request failed");
            return Err(err);
        }

        let anthropic_resp: AnthropicResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            }
        })?;

        tracing::debug!(
            id = %anthropic_resp.id,
            input_tokens = anthropic_resp.usage.input_tokens,
            output_tokens = anthropic_resp.usage.output_tokens,
            "anthropic completion"
        );

        Ok(CompletionResponse {
            content: anthropic_resp.text(),
            stop_reason: parse_stop_reason(anthropic_resp.stop_reason.as_deref()),
            usage: Usage {
                input_tokens: anthropic_resp.usage.input_tokens,
                output_tokens: anthropic_resp.usage.output_tokens,
            },
            id: anthropic_resp.id,
            model: anthropic_resp.model,
        })
    }
}
