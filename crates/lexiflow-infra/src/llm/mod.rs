//! Generation provider implementations.
//!
//! Contains the Anthropic implementation of the `GenerationProvider` trait
//! defined in `lexiflow-core`, plus a factory building it from config.

pub mod anthropic;

use std::time::Duration;

use secrecy::SecretString;

use lexiflow_core::llm::BoxGenerationProvider;
use lexiflow_types::config::GenerationConfig;
use lexiflow_types::llm::LlmError;

use self::anthropic::AnthropicProvider;

/// Create a [`BoxGenerationProvider`] from the `[generation]` config section.
///
/// # Errors
///
/// Returns `AuthenticationFailed` when no API key is available.
pub fn create_provider(
    config: &GenerationConfig,
    api_key: Option<SecretString>,
) -> Result<BoxGenerationProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let provider = AnthropicProvider::new(
        key,
        config.model.clone(),
        Duration::from_secs(config.timeout_secs),
    )?
    .with_base_url(config.base_url.clone());
    Ok(BoxGenerationProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_anthropic() {
        let provider =
            create_provider(&GenerationConfig::default(), Some(SecretString::from("sk-test"))).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-sonnet-4-5");
    }

    #[test]
    fn test_create_provider_missing_key() {
        let result = create_provider(&GenerationConfig::default(), None);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));
    }
}
