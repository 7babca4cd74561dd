//! Step runner: executes one step of a built-in workflow.
//!
//! `StepRunner` dispatches on `StepAction`: extraction runs the local
//! analyzer, enrichment fans out over the dictionary router, generation
//! calls the content refiner, parallel groups run their branches in a
//! `JoinSet`, and assembly merges earlier sections.

use std::sync::Arc;

use lexiflow_types::content::ItemKind;
use lexiflow_types::workflow::{BranchDefinition, StepAction, StepDefinition};
use serde_json::{Map, Value, json};
use tokio::task::JoinSet;

use super::context::{CANDIDATES_KEY, ENTRIES_KEY, StepContext, merge_section};
use crate::analysis::{AnalysisError, TextAnalyzer};
use crate::dictionary::DictionaryRouter;
use crate::refine::{ContentRefiner, RefineRequest, RefinementError};

// ---------------------------------------------------------------------------
// StepError
// ---------------------------------------------------------------------------

/// Errors that can occur during step execution.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Refinement(#[from] RefinementError),

    /// A branch of a parallel group failed. Reported once every branch
    /// has finished.
    #[error("branch '{branch}' failed: {source}")]
    Branch {
        branch: String,
        #[source]
        source: Box<StepError>,
    },

    /// A branch task panicked or was aborted.
    #[error("branch task failed: {0}")]
    Join(String),

    /// Persisted run data could not be decoded.
    #[error("stored run data is corrupt: {0}")]
    Corrupt(String),
}

impl StepError {
    /// The innermost error, looking through branch wrappers.
    pub fn root(&self) -> &StepError {
        match self {
            StepError::Branch { source, .. } => source.root(),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// StepRunner
// ---------------------------------------------------------------------------

/// Executes individual workflow steps.
pub struct StepRunner {
    analyzer: TextAnalyzer,
    router: Arc<DictionaryRouter>,
    refiner: Arc<ContentRefiner>,
}

impl StepRunner {
    pub fn new(router: Arc<DictionaryRouter>, refiner: Arc<ContentRefiner>) -> Self {
        Self {
            analyzer: TextAnalyzer::new(),
            router,
            refiner,
        }
    }

    /// Run a step and return its output object.
    pub async fn run(&self, step: &StepDefinition, ctx: &StepContext) -> Result<Value, StepError> {
        match &step.action {
            StepAction::ExtractCandidates { max_candidates } => {
                self.run_extract(*max_candidates, ctx)
            }
            StepAction::EnrichCandidates => Ok(self.run_enrich(ctx).await),
            StepAction::Generate { kind, focus } => {
                let items = generate(&self.refiner, ctx, *kind, focus.as_deref()).await?;
                Ok(json!({ kind.section(): items }))
            }
            StepAction::Parallel { branches } => self.run_parallel(branches, ctx).await,
            StepAction::Assemble => Ok(Value::Object(ctx.sections.clone())),
        }
    }

    fn run_extract(&self, max_candidates: usize, ctx: &StepContext) -> Result<Value, StepError> {
        let candidates = self.analyzer.extract_candidates(
            &ctx.input.reading_text,
            ctx.language.code(),
            max_candidates,
        )?;
        tracing::debug!(count = candidates.len(), "extracted candidates");
        Ok(json!({ CANDIDATES_KEY: candidates }))
    }

    async fn run_enrich(&self, ctx: &StepContext) -> Value {
        let words: Vec<String> = ctx
            .candidates
            .iter()
            .map(|c| c.normalized_form.clone())
            .collect();
        let entries = self.router.lookup_many(&words, ctx.language).await;

        let found = entries.iter().filter(|e| e.found).count();
        let degraded = entries.iter().filter(|e| e.degraded).count();
        tracing::debug!(
            language = %ctx.language,
            words = words.len(),
            found,
            degraded,
            "enriched candidates"
        );
        json!({ ENTRIES_KEY: entries })
    }

    /// Run every branch to completion, then fail with the first failing
    /// branch (in declared order) or merge all outputs by section.
    async fn run_parallel(
        &self,
        branches: &[BranchDefinition],
        ctx: &StepContext,
    ) -> Result<Value, StepError> {
        let shared = Arc::new(ctx.clone());
        let mut join_set = JoinSet::new();

        for (index, branch) in branches.iter().enumerate() {
            let refiner = Arc::clone(&self.refiner);
            let ctx = Arc::clone(&shared);
            let branch = branch.clone();
            join_set.spawn(async move {
                let result = generate(&refiner, &ctx, branch.kind, branch.focus.as_deref()).await;
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<Value, StepError>>> =
            branches.iter().map(|_| None).collect();
        let mut join_failure = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    results[index] = Some(result.map(|items| json!(items)));
                }
                Err(e) => join_failure = Some(StepError::Join(e.to_string())),
            }
        }

        let mut sections = Map::new();
        for (branch, result) in branches.iter().zip(results) {
            match result {
                Some(Ok(items)) => merge_section(&mut sections, branch.kind.section(), items),
                Some(Err(e)) => {
                    tracing::debug!(branch = %branch.id, error = %e, "parallel branch failed");
                    return Err(StepError::Branch {
                        branch: branch.id.clone(),
                        source: Box::new(e),
                    });
                }
                None => {}
            }
        }
        if let Some(e) = join_failure {
            return Err(e);
        }

        Ok(Value::Object(sections))
    }
}

async fn generate(
    refiner: &ContentRefiner,
    ctx: &StepContext,
    kind: ItemKind,
    focus: Option<&str>,
) -> Result<Vec<lexiflow_types::content::GeneratedItem>, StepError> {
    let request = RefineRequest {
        kind,
        candidates: &ctx.candidates,
        entries: &ctx.entries,
        source_text: &ctx.input.reading_text,
        target_level: ctx.input.target_level,
        target_language: ctx.language,
        max_items: ctx.input.max_items,
        source_reading_ids: &ctx.input.source_reading_ids,
        focus,
        feedback: ctx.feedback.as_deref(),
    };
    Ok(refiner.refine(&request).await?)
}
