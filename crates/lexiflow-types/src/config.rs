//! Global configuration types for lexiflow.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! server bind address, generation model, retry policy and concurrency limits.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.lexiflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Generation provider settings. The API key is read from the environment,
/// never from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_generation_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Bound on in-flight external calls (dictionary + generation), shared
    /// by every run in the process.
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
    #[serde(default = "default_max_regenerations")]
    pub max_regenerations: u32,
}

fn default_max_concurrent_calls() -> usize {
    8
}

fn default_step_timeout_secs() -> u64 {
    120
}

fn default_max_regenerations() -> u32 {
    3
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            step_timeout_secs: default_step_timeout_secs(),
            max_regenerations: default_max_regenerations(),
        }
    }
}

/// Exponential backoff for transient provider failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_factor")]
    pub factor: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_factor() -> u32 {
    2
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            factor: default_factor(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default = "default_dictionary_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_dictionary_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("lexiflow/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_dictionary_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.retry.factor, 2);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.limits.max_concurrent_calls, 8);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.limits.max_regenerations, 3);
        assert!(config.dictionary.user_agent.starts_with("lexiflow/"));
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 8080

[generation]
model = "claude-haiku-4-5"

[limits]
max_concurrent_calls = 2

[retry]
base_delay_ms = 100
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.model, "claude-haiku-4-5");
        assert_eq!(config.generation.max_tokens, 4096);
        assert_eq!(config.limits.max_concurrent_calls, 2);
        assert_eq!(config.retry.base_delay_ms, 100);
        assert_eq!(config.retry.factor, 2);
    }
}
