//! DictionaryProvider trait and its object-safe wrapper.
//!
//! Providers fetch a provider-shaped raw response and adapt it to the
//! canonical `DictionaryEntry` themselves, so nothing past this boundary
//! ever sees provider-specific fields.
//!
//! Dynamic dispatch follows the same blanket-impl pattern as the generation
//! provider wrapper:
//! 1. Define an object-safe `DictionaryProviderDyn` trait with boxed futures
//! 2. Blanket-impl `DictionaryProviderDyn` for all `T: DictionaryProvider`
//! 3. `BoxDictionaryProvider` wraps `Box<dyn DictionaryProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use lexiflow_types::dictionary::DictionaryEntry;
use lexiflow_types::error::DictionaryError;
use lexiflow_types::language::Language;

/// A dictionary backend for one or more languages.
///
/// Implementations live in lexiflow-infra (e.g. `FreeDictionaryProvider`).
/// Must tolerate concurrent calls. A missing word is `Ok(None)`; only
/// transport problems are errors.
pub trait DictionaryProvider: Send + Sync {
    /// Provider-specific response shape.
    type Raw: Send;

    /// Stable identifier recorded as `DictionaryEntry::source`.
    fn id(&self) -> &str;

    /// Fetch the raw response for a normalized word.
    fn fetch(
        &self,
        word: &str,
        language: Language,
    ) -> impl Future<Output = Result<Option<Self::Raw>, DictionaryError>> + Send;

    /// Map a raw response onto the canonical entry.
    fn adapt(&self, word: &str, language: Language, raw: Self::Raw) -> DictionaryEntry;
}

/// Object-safe version of [`DictionaryProvider`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; the associated `Raw` type is
/// erased by adapting inside the boxed future.
pub trait DictionaryProviderDyn: Send + Sync {
    fn id(&self) -> &str;

    fn lookup_boxed<'a>(
        &'a self,
        word: &'a str,
        language: Language,
    ) -> Pin<Box<dyn Future<Output = Result<DictionaryEntry, DictionaryError>> + Send + 'a>>;
}

/// Blanket implementation: any `DictionaryProvider` automatically implements `DictionaryProviderDyn`.
impl<T: DictionaryProvider> DictionaryProviderDyn for T {
    fn id(&self) -> &str {
        DictionaryProvider::id(self)
    }

    fn lookup_boxed<'a>(
        &'a self,
        word: &'a str,
        language: Language,
    ) -> Pin<Box<dyn Future<Output = Result<DictionaryEntry, DictionaryError>> + Send + 'a>> {
        Box::pin(async move {
            match self.fetch(word, language).await? {
                Some(raw) => Ok(self.adapt(word, language, raw)),
                None => Ok(DictionaryEntry::not_found(
                    word,
                    language,
                    DictionaryProvider::id(self),
                )),
            }
        })
    }
}

/// Type-erased dictionary provider for per-language registries.
pub struct BoxDictionaryProvider {
    inner: Box<dyn DictionaryProviderDyn + Send + Sync>,
}

impl BoxDictionaryProvider {
    /// Wrap a concrete `DictionaryProvider` in a type-erased box.
    pub fn new<T: DictionaryProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Fetch and adapt in one call.
    pub async fn lookup(
        &self,
        word: &str,
        language: Language,
    ) -> Result<DictionaryEntry, DictionaryError> {
        self.inner.lookup_boxed(word, language).await
    }
}

impl std::fmt::Debug for BoxDictionaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxDictionaryProvider")
            .field("id", &self.id())
            .finish()
    }
}
