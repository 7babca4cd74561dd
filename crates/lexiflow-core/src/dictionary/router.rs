//! Language-keyed dictionary routing with caching and provider fallback.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;

use lexiflow_types::dictionary::DictionaryEntry;
use lexiflow_types::error::DictionaryError;
use lexiflow_types::language::Language;

use super::provider::BoxDictionaryProvider;
use crate::limiter::ConcurrencyLimiter;
use crate::retry::RetryPolicy;

/// Source id recorded when no provider is registered for a language.
pub const NO_PROVIDER: &str = "none";

/// Routes lookups to per-language provider chains.
///
/// Providers for a language are tried in registration order: a provider
/// answering "not found" or failing after retries hands over to the next.
/// Definitive answers (found or not found) are cached under
/// `(language, normalized word)`; degraded answers are not, so a later
/// lookup can still succeed once the provider recovers.
pub struct DictionaryRouter {
    providers: HashMap<Language, Vec<Arc<BoxDictionaryProvider>>>,
    cache: DashMap<(Language, String), DictionaryEntry>,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
}

impl DictionaryRouter {
    pub fn new(limiter: ConcurrencyLimiter, retry: RetryPolicy) -> Self {
        Self {
            providers: HashMap::new(),
            cache: DashMap::new(),
            limiter,
            retry,
        }
    }

    /// Append a provider to the fallback chain of each listed language.
    pub fn register(&mut self, languages: &[Language], provider: BoxDictionaryProvider) {
        let provider = Arc::new(provider);
        for lang in languages {
            self.providers
                .entry(*lang)
                .or_default()
                .push(Arc::clone(&provider));
        }
    }

    /// Provider ids registered for a language, in fallback order.
    pub fn provider_ids(&self, language: Language) -> Vec<&str> {
        self.providers
            .get(&language)
            .map(|chain| chain.iter().map(|p| p.id()).collect())
            .unwrap_or_default()
    }

    /// Number of cached entries.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Look up one word. Never fails: unreachable providers yield a
    /// `found: false, degraded: true` entry.
    pub async fn lookup(&self, word: &str, language: Language) -> DictionaryEntry {
        let normalized = normalize(word);
        let key = (language, normalized.clone());

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(language = %language, word = %normalized, "dictionary cache hit");
            return hit.clone();
        }

        let Some(chain) = self.providers.get(&language).filter(|c| !c.is_empty()) else {
            return DictionaryEntry::not_found(&normalized, language, NO_PROVIDER);
        };

        let mut last_not_found: Option<DictionaryEntry> = None;
        let mut last_unavailable: Option<&str> = None;

        let limiter = &self.limiter;
        let word = normalized.as_str();

        for provider in chain {
            let result = self
                .retry
                .run(
                    provider.id(),
                    DictionaryError::is_transient,
                    move |_| async move {
                        let _permit = limiter.acquire().await.map_err(|_| {
                            DictionaryError::Transport("concurrency limiter closed".to_string())
                        })?;
                        provider.lookup(word, language).await
                    },
                )
                .await;

            match result {
                Ok(entry) if entry.found => {
                    self.cache.insert(key, entry.clone());
                    return entry;
                }
                Ok(entry) => {
                    last_not_found = Some(entry);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.id(),
                        language = %language,
                        word = %normalized,
                        error = %e,
                        "dictionary provider unavailable"
                    );
                    last_unavailable = Some(provider.id());
                }
            }
        }

        match last_not_found {
            Some(entry) => {
                self.cache.insert(key, entry.clone());
                entry
            }
            None => DictionaryEntry::unavailable(
                &normalized,
                language,
                last_unavailable.unwrap_or(NO_PROVIDER),
            ),
        }
    }

    /// Look up many words concurrently (bounded by the shared limiter).
    /// Results come back in input order.
    pub async fn lookup_many(&self, words: &[String], language: Language) -> Vec<DictionaryEntry> {
        join_all(words.iter().map(|w| self.lookup(w, language))).await
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use lexiflow_types::dictionary::DefinitionGroup;

    use crate::dictionary::provider::DictionaryProvider;

    /// Scripted provider: knows a fixed word list, can be made to fail.
    struct MockProvider {
        id: &'static str,
        known: &'static [&'static str],
        failing: bool,
        calls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn new(id: &'static str, known: &'static [&'static str]) -> Self {
            Self {
                id,
                known,
                failing: false,
                calls: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                max_in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(id: &'static str) -> Self {
            Self {
                failing: true,
                ..Self::new(id, &[])
            }
        }
    }

    impl DictionaryProvider for MockProvider {
        type Raw = String;

        fn id(&self) -> &str {
            self.id
        }

        async fn fetch(
            &self,
            word: &str,
            _language: Language,
        ) -> Result<Option<String>, DictionaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing {
                return Err(DictionaryError::Transport("connection refused".into()));
            }
            Ok(self
                .known
                .contains(&word)
                .then(|| format!("meaning of {word}")))
        }

        fn adapt(&self, word: &str, language: Language, raw: String) -> DictionaryEntry {
            DictionaryEntry {
                word: word.to_string(),
                language,
                found: true,
                definitions: vec![DefinitionGroup {
                    part_of_speech: "noun".into(),
                    meanings: vec![raw],
                }],
                pronunciations: vec![],
                source: self.id.to_string(),
                degraded: false,
            }
        }
    }

    fn router() -> DictionaryRouter {
        DictionaryRouter::new(ConcurrencyLimiter::new(4), RetryPolicy::immediate(3))
    }

    #[tokio::test]
    async fn test_found_and_cached() {
        let provider = MockProvider::new("mock", &["gato"]);
        let calls = Arc::clone(&provider.calls);
        let mut router = router();
        router.register(&[Language::Es], BoxDictionaryProvider::new(provider));

        let first = router.lookup("Gato", Language::Es).await;
        assert!(first.found);
        assert_eq!(first.word, "gato");
        let second = router.lookup("gato ", Language::Es).await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "cache hit must bypass provider");
    }

    #[tokio::test]
    async fn test_cache_is_per_language() {
        let provider = MockProvider::new("mock", &["casa"]);
        let calls = Arc::clone(&provider.calls);
        let mut router = router();
        router.register(&[Language::Es, Language::Pt], BoxDictionaryProvider::new(provider));

        router.lookup("casa", Language::Es).await;
        router.lookup("casa", Language::Pt).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(router.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_degraded() {
        let mut router = router();
        router.register(&[Language::Es], BoxDictionaryProvider::new(MockProvider::new("mock", &[])));

        let entry = router.lookup("zorblat", Language::Es).await;
        assert!(!entry.found);
        assert!(!entry.degraded);
        assert_eq!(entry.source, "mock");
    }

    #[tokio::test]
    async fn test_unavailable_is_degraded_and_not_cached() {
        let provider = MockProvider::failing("down");
        let calls = Arc::clone(&provider.calls);
        let mut router = router();
        router.register(&[Language::Es], BoxDictionaryProvider::new(provider));

        let entry = router.lookup("gato", Language::Es).await;
        assert!(!entry.found);
        assert!(entry.degraded);
        assert_eq!(entry.source, "down");
        // Three attempts under the retry policy, nothing cached.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(router.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let mut router = router();
        router.register(&[Language::Fr], BoxDictionaryProvider::new(MockProvider::failing("primary")));
        router.register(&[Language::Fr], BoxDictionaryProvider::new(MockProvider::new("secondary", &["chat"])));
        assert_eq!(router.provider_ids(Language::Fr), vec!["primary", "secondary"]);

        let entry = router.lookup("chat", Language::Fr).await;
        assert!(entry.found);
        assert_eq!(entry.source, "secondary");
    }

    #[tokio::test]
    async fn test_no_provider_for_language() {
        let router = router();
        let entry = router.lookup("domus", Language::La).await;
        assert!(!entry.found);
        assert!(!entry.degraded);
        assert_eq!(entry.source, NO_PROVIDER);
    }

    #[tokio::test]
    async fn test_lookup_many_preserves_order_and_bounds_concurrency() {
        let provider = MockProvider::new("mock", &["uno", "tres"]);
        let max_in_flight = Arc::clone(&provider.max_in_flight);
        let mut router = DictionaryRouter::new(ConcurrencyLimiter::new(2), RetryPolicy::immediate(1));
        router.register(&[Language::Es], BoxDictionaryProvider::new(provider));

        let words: Vec<String> = ["uno", "dos", "tres", "cuatro", "cinco", "seis"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let entries = router.lookup_many(&words, Language::Es).await;

        let returned: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(returned, vec!["uno", "dos", "tres", "cuatro", "cinco", "seis"]);
        assert!(entries[0].found && !entries[1].found && entries[2].found);
        assert!(max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
