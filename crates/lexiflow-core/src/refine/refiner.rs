//! ContentRefiner: structured-output generation with schema-retry and backoff.

use std::sync::Arc;

use lexiflow_types::content::GeneratedItem;
use lexiflow_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, OutputConfig, StopReason,
};

use super::RefinementError;
use super::prompt::{RefineRequest, build_instruction, system_prompt};
use super::schema::{output_schema, schema_name, validate_response};
use crate::limiter::ConcurrencyLimiter;
use crate::llm::BoxGenerationProvider;
use crate::retry::RetryPolicy;

/// Attempts allowed when the response fails validation.
pub const SCHEMA_ATTEMPTS: u32 = 3;

/// Turns candidates into a validated, ranked list of generated items.
///
/// Two independent retry loops: transient provider failures are retried
/// with exponential backoff inside each attempt, and schema failures are
/// retried up to [`SCHEMA_ATTEMPTS`] times with the validation error fed
/// back into the instruction.
pub struct ContentRefiner {
    provider: Arc<BoxGenerationProvider>,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
    max_tokens: u32,
}

impl ContentRefiner {
    pub fn new(
        provider: Arc<BoxGenerationProvider>,
        limiter: ConcurrencyLimiter,
        retry: RetryPolicy,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            limiter,
            retry,
            max_tokens,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate at most `request.max_items` items, in the model's order,
    /// each tagged with `request.source_reading_ids`.
    pub async fn refine(
        &self,
        request: &RefineRequest<'_>,
    ) -> Result<Vec<GeneratedItem>, RefinementError> {
        let output_config = OutputConfig::json_schema(
            schema_name(request.kind),
            output_schema(request.kind),
        );
        let mut corrections: Vec<String> = Vec::new();

        for attempt in 1..=SCHEMA_ATTEMPTS {
            let completion = CompletionRequest {
                model: self.provider.model().to_string(),
                messages: vec![Message {
                    role: MessageRole::User,
                    content: build_instruction(request, &corrections),
                }],
                system: Some(system_prompt().to_string()),
                max_tokens: self.max_tokens,
                temperature: None,
                output_config: Some(output_config.clone()),
            };

            let response = self.complete_with_backoff(&completion).await?;

            match check_response(request, &response) {
                Ok(items) => {
                    tracing::debug!(
                        kind = %request.kind,
                        attempt,
                        items = items.len(),
                        "refinement succeeded"
                    );
                    return Ok(finalize(items, request));
                }
                Err(reason) => {
                    tracing::warn!(
                        kind = %request.kind,
                        attempt,
                        max_attempts = SCHEMA_ATTEMPTS,
                        reason = %reason,
                        "generation output failed validation"
                    );
                    corrections.push(reason);
                }
            }
        }

        Err(RefinementError::Schema {
            attempts: SCHEMA_ATTEMPTS,
            reason: corrections.pop().unwrap_or_default(),
        })
    }

    async fn complete_with_backoff(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, RefinementError> {
        let provider = &self.provider;
        let limiter = &self.limiter;

        self.retry
            .run(provider.name(), LlmError::is_transient, move |_| async move {
                let _permit = limiter.acquire().await.map_err(|_| LlmError::Provider {
                    message: "concurrency limiter closed".to_string(),
                })?;
                provider.complete(request).await
            })
            .await
            .map_err(RefinementError::Provider)
    }
}

fn check_response(
    request: &RefineRequest<'_>,
    response: &CompletionResponse,
) -> Result<Vec<GeneratedItem>, String> {
    if response.stop_reason == StopReason::MaxTokens {
        return Err("the response was cut off at the token limit; return fewer items".to_string());
    }
    validate_response(request.kind, &response.content)
}

fn finalize(items: Vec<GeneratedItem>, request: &RefineRequest<'_>) -> Vec<GeneratedItem> {
    items
        .into_iter()
        .take(request.max_items as usize)
        .map(|mut item| {
            item.set_source_reading_ids(request.source_reading_ids);
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lexiflow_types::analysis::{Candidate, PartOfSpeech};
    use lexiflow_types::content::{CefrLevel, ItemKind};
    use lexiflow_types::language::Language;
    use lexiflow_types::llm::Usage;

    use crate::llm::GenerationProvider;

    /// Replays scripted outcomes in order and records every prompt it saw.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Arc<Mutex<Vec<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                prompts: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl GenerationProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.output_config.is_some());
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidRequest("script exhausted".into())));
            next.map(|content| CompletionResponse {
                id: "msg".into(),
                content,
                model: "scripted-1".into(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    fn vocab_response(words: &[&str]) -> String {
        let items: Vec<_> = words
            .iter()
            .map(|w| {
                serde_json::json!({
                    "word": w,
                    "partOfSpeech": "noun",
                    "definition": format!("meaning of {w}"),
                    "exampleSentence": format!("Veo {w}."),
                    "cefrLevel": "A2",
                    "difficulty": 2
                })
            })
            .collect();
        serde_json::json!({ "items": items }).to_string()
    }

    fn refiner(provider: ScriptedProvider) -> ContentRefiner {
        ContentRefiner::new(
            Arc::new(BoxGenerationProvider::new(provider)),
            ConcurrencyLimiter::new(2),
            RetryPolicy::immediate(3),
            1024,
        )
    }

    fn candidates() -> Vec<Candidate> {
        vec![Candidate {
            word: "casa".into(),
            normalized_form: "casa".into(),
            part_of_speech: PartOfSpeech::Noun,
            frequency: 2,
        }]
    }

    fn request<'a>(candidates: &'a [Candidate], ids: &'a [String], max_items: u32) -> RefineRequest<'a> {
        RefineRequest {
            kind: ItemKind::Vocabulary,
            candidates,
            entries: &[],
            source_text: "El gato duerme en la casa.",
            target_level: CefrLevel::A2,
            target_language: Language::Es,
            max_items,
            source_reading_ids: ids,
            focus: None,
            feedback: None,
        }
    }

    #[tokio::test]
    async fn test_truncates_in_model_order_and_tags_provenance() {
        let provider = ScriptedProvider::new(vec![Ok(vocab_response(&["zeta", "alfa", "casa"]))]);
        let refiner = refiner(provider);
        let c = candidates();
        let ids = vec!["reading-7".to_string()];

        let items = refiner.refine(&request(&c, &ids, 2)).await.unwrap();
        assert_eq!(items.len(), 2);
        let words: Vec<_> = items
            .iter()
            .map(|i| match i {
                GeneratedItem::Vocabulary(v) => v.word.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(words, vec!["zeta", "alfa"], "must keep model ranking");
        assert!(items.iter().all(|i| i.source_reading_ids() == ["reading-7"]));
    }

    #[tokio::test]
    async fn test_schema_retry_feeds_back_error() {
        let provider = ScriptedProvider::new(vec![
            Ok("{\"items\": \"nope\"}".to_string()),
            Ok(vocab_response(&["casa"])),
        ]);
        let prompts = Arc::clone(&provider.prompts);
        let refiner = refiner(provider);
        let c = candidates();

        let items = refiner.refine(&request(&c, &[], 5)).await.unwrap();
        assert_eq!(items.len(), 1);

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("invalid because"));
        assert!(prompts[1].contains("The previous response was invalid because"));
    }

    #[tokio::test]
    async fn test_schema_error_after_three_attempts() {
        let provider = ScriptedProvider::new(vec![
            Ok("garbage".to_string()),
            Ok("{}".to_string()),
            Ok("{\"items\": []}".to_string()),
            Ok(vocab_response(&["never reached"])),
        ]);
        let calls = Arc::clone(&provider.calls);
        let refiner = refiner(provider);
        let c = candidates();

        let err = refiner.refine(&request(&c, &[], 5)).await.unwrap_err();
        match err {
            RefinementError::Schema { attempts, reason } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("empty"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_errors_retried_invisibly() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::RateLimited { retry_after_ms: None }),
            Err(LlmError::Overloaded("busy".into())),
            Ok(vocab_response(&["casa"])),
        ]);
        let calls = Arc::clone(&provider.calls);
        let refiner = refiner(provider);
        let c = candidates();

        let items = refiner.refine(&request(&c, &[], 5)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_provider_error_after_backoff_exhaustion() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
        ]);
        let refiner = refiner(provider);
        let c = candidates();

        let err = refiner.refine(&request(&c, &[], 5)).await.unwrap_err();
        assert!(matches!(err, RefinementError::Provider(LlmError::Timeout)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_permanent_provider_error_not_retried() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::AuthenticationFailed)]);
        let calls = Arc::clone(&provider.calls);
        let refiner = refiner(provider);
        let c = candidates();

        let err = refiner.refine(&request(&c, &[], 5)).await.unwrap_err();
        assert!(matches!(err, RefinementError::Provider(LlmError::AuthenticationFailed)));
        assert!(!err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
