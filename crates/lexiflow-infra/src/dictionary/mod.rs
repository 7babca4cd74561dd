//! HTTP dictionary providers.
//!
//! Each provider fetches its own response shape and adapts it to the
//! canonical `DictionaryEntry` inside its `DictionaryProvider` impl.

pub mod free_dictionary;
pub mod wiktionary;

use std::time::Duration;

use lexiflow_core::dictionary::{BoxDictionaryProvider, DictionaryRouter};
use lexiflow_types::config::DictionaryConfig;
use lexiflow_types::error::DictionaryError;
use lexiflow_types::language::Language;

pub use free_dictionary::FreeDictionaryProvider;
pub use wiktionary::WiktionaryProvider;

/// Build the shared HTTP client used by the dictionary providers.
pub fn http_client(config: &DictionaryConfig) -> Result<reqwest::Client, DictionaryError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| DictionaryError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Register the default provider chains on a router.
///
/// English tries the Free Dictionary API first and falls back to
/// Wiktionary; every other language goes straight to Wiktionary.
pub fn register_default_providers(
    router: &mut DictionaryRouter,
    config: &DictionaryConfig,
) -> Result<(), DictionaryError> {
    let client = http_client(config)?;

    router.register(
        &[Language::En],
        BoxDictionaryProvider::new(FreeDictionaryProvider::new(client.clone())),
    );
    router.register(
        &Language::ALL,
        BoxDictionaryProvider::new(WiktionaryProvider::new(client)),
    );
    Ok(())
}

/// Map a reqwest transport error onto a `DictionaryError`.
pub(crate) fn transport_error(err: reqwest::Error) -> DictionaryError {
    if err.is_timeout() {
        DictionaryError::Timeout
    } else if err.is_decode() {
        DictionaryError::Decode(err.to_string())
    } else {
        DictionaryError::Transport(err.to_string())
    }
}

/// Map a non-success status onto a `DictionaryError`. 404 is handled by
/// the callers as "not found" before this is reached.
pub(crate) fn status_error(status: reqwest::StatusCode) -> DictionaryError {
    match status.as_u16() {
        429 => DictionaryError::RateLimited,
        408 | 504 => DictionaryError::Timeout,
        code => DictionaryError::Transport(format!("HTTP {code}")),
    }
}
