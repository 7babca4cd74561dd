//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. The engine is generic over its run repository; AppState pins it to
//! the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use lexiflow_core::analysis::TextAnalyzer;
use lexiflow_core::dictionary::DictionaryRouter;
use lexiflow_core::limiter::ConcurrencyLimiter;
use lexiflow_core::llm::{BoxGenerationProvider, GenerationProvider};
use lexiflow_core::refine::ContentRefiner;
use lexiflow_core::retry::RetryPolicy;
use lexiflow_core::workflow::{StepRunner, WorkflowEngine, WorkflowRegistry};
use lexiflow_infra::config::{API_KEY_ENV, api_key_from_env, load_global_config};
use lexiflow_infra::dictionary::register_default_providers;
use lexiflow_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use lexiflow_infra::llm::create_provider;
use lexiflow_infra::sqlite::pool::database_url;
use lexiflow_infra::sqlite::{DatabasePool, SqliteRunRepository};
use lexiflow_types::config::GlobalConfig;
use lexiflow_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Concrete engine type pinned to the SQLite run store.
pub type ConcreteEngine = WorkflowEngine<SqliteRunRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteEngine>,
    pub analyzer: TextAnalyzer,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    /// False when no API key was found; triggering is refused up front
    /// instead of creating runs that can only fail.
    pub generation_ready: bool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the DB,
    /// wire providers and the engine.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open run database")?;

        // One limiter for every external call in the process.
        let limiter = ConcurrencyLimiter::new(config.limits.max_concurrent_calls);
        let retry = RetryPolicy::from(&config.retry);

        let mut router = DictionaryRouter::new(limiter.clone(), retry.clone());
        register_default_providers(&mut router, &config.dictionary)
            .context("failed to set up dictionary providers")?;

        let (provider, generation_ready) =
            match create_provider(&config.generation, api_key_from_env()) {
                Ok(provider) => (provider, true),
                Err(LlmError::AuthenticationFailed) => {
                    tracing::warn!("{API_KEY_ENV} is not set; workflow triggers are disabled");
                    (BoxGenerationProvider::new(MissingKeyProvider), false)
                }
                Err(e) => return Err(e).context("failed to set up generation provider"),
            };

        let refiner = ContentRefiner::new(
            Arc::new(provider),
            limiter,
            retry,
            config.generation.max_tokens,
        );

        let registry = WorkflowRegistry::with_builtins(config.limits.max_regenerations)
            .context("built-in workflow definitions are invalid")?;

        let engine = WorkflowEngine::new(
            Arc::new(registry),
            SqliteRunRepository::new(db_pool),
            StepRunner::new(Arc::new(router), Arc::new(refiner)),
            Duration::from_secs(config.limits.step_timeout_secs),
        );

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            engine: Arc::new(engine),
            analyzer: TextAnalyzer::new(),
            config: Arc::new(config),
            data_dir,
            generation_ready,
        })
    }
}

/// Stand-in provider used when no API key is configured.
struct MissingKeyProvider;

impl GenerationProvider for MissingKeyProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn model(&self) -> &str {
        ""
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}
