//! Workflow engine: trigger, status and resume over durable runs.
//!
//! A run is an explicit persisted state machine:
//!
//! ```text
//! PENDING -> RUNNING -> (SUSPENDED <-> RUNNING)* -> SUCCESS | FAILED
//! ```
//!
//! Steps execute in declared order. After every transition the run is
//! checkpointed, so resuming is "load, validate, continue from
//! `currentStep`". A reviewed step suspends right after computing its
//! output; the output only joins `completedStepOutputs` once approved.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use lexiflow_types::error::RepositoryError;
use lexiflow_types::language::Language;
use lexiflow_types::workflow::{
    ErrorCategory, ErrorInfo, GenerationInput, ResumeDecision, StepDefinition, WorkflowDefinition,
    WorkflowRun, WorkflowRunStatus,
};
use serde_json::Value;
use uuid::Uuid;

use super::checkpoint::{CheckpointError, CheckpointManager};
use super::context::StepContext;
use super::definition::{InputError, parse_resume, validate_input};
use super::registry::WorkflowRegistry;
use super::step_runner::{StepError, StepRunner};
use crate::refine::RefinementError;
use crate::repository::RunRepository;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default step-level timeout (2 minutes).
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 120;

/// Slack on top of the step timeout before a RUNNING run counts as stalled.
pub const STALL_GRACE: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Errors returned to the caller of an engine operation.
///
/// A step failing is not an `EngineError`: it produces a FAILED run, which
/// is returned normally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Trigger input failed validation. No run was created.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Trigger input named a language the analyzer cannot handle.
    #[error("{0}")]
    UnsupportedLanguage(String),

    #[error("unknown workflow: '{0}'")]
    UnknownWorkflow(String),

    #[error("workflow run not found: {0}")]
    RunNotFound(Uuid),

    /// `resumeData` does not match the step's resume schema. The run is
    /// still SUSPENDED.
    #[error("resume data rejected: {0}")]
    ResumeMismatch(String),

    /// Resume on a run that is not SUSPENDED.
    #[error("run is {status}; only SUSPENDED runs can be resumed")]
    RunNotResumable { status: WorkflowRunStatus },

    /// Another caller changed the run between our read and our write.
    #[error("run was modified concurrently")]
    ConcurrentModification,

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CheckpointError> for EngineError {
    fn from(e: CheckpointError) -> Self {
        match e {
            CheckpointError::Conflict(_) => EngineError::ConcurrentModification,
            CheckpointError::Repository(e) => EngineError::Repository(e),
        }
    }
}

impl From<RepositoryError> for EngineError {
    fn from(e: RepositoryError) -> Self {
        CheckpointError::from(e).into()
    }
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Runs registered workflows against a `RunRepository`.
///
/// Generic over `R: RunRepository` for storage flexibility. Each call
/// drives one run until it suspends or terminates. `trigger_detached` and
/// `resume_detached` do the same on a spawned task, so the run still settles
/// when the caller goes away.
pub struct WorkflowEngine<R: RunRepository> {
    registry: Arc<WorkflowRegistry>,
    checkpoint: CheckpointManager<R>,
    runner: StepRunner,
    step_timeout: Duration,
}

impl<R: RunRepository> WorkflowEngine<R> {
    pub fn new(
        registry: Arc<WorkflowRegistry>,
        repo: R,
        runner: StepRunner,
        step_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            checkpoint: CheckpointManager::new(repo),
            runner,
            step_timeout,
        }
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Validate `input`, create a run and execute it until it suspends,
    /// succeeds or fails.
    pub async fn trigger(
        &self,
        workflow_name: &str,
        input: &Value,
        owner_id: &str,
    ) -> Result<WorkflowRun, EngineError> {
        let definition = self
            .registry
            .get(workflow_name)
            .ok_or_else(|| EngineError::UnknownWorkflow(workflow_name.to_string()))?;

        let validated = validate_input(&definition.input_schema, input).map_err(|e| match e {
            InputError::Invalid(msg) => EngineError::Validation(msg),
            InputError::UnsupportedLanguage(msg) => EngineError::UnsupportedLanguage(msg),
        })?;
        let input_data = serde_json::to_value(&validated.input)
            .map_err(|e| EngineError::Internal(format!("encode input: {e}")))?;

        let mut run = WorkflowRun::new(workflow_name, input_data, owner_id);
        self.checkpoint.repo().create_run(&run).await?;

        tracing::info!(
            run_id = %run.id,
            workflow = workflow_name,
            owner = owner_id,
            language = %validated.language,
            "workflow run started"
        );

        self.drive(&mut run, definition, validated.language, 0, None)
            .await?;
        Ok(run)
    }

    /// Read-only view of a run.
    pub async fn status(&self, run_id: Uuid) -> Result<WorkflowRun, EngineError> {
        self.checkpoint
            .repo()
            .get_run(&run_id)
            .await?
            .ok_or(EngineError::RunNotFound(run_id))
    }

    /// Apply a reviewer decision to a SUSPENDED run.
    ///
    /// Approval takes the suspended payload verbatim as the step's output
    /// and continues. Rejection regenerates the same step with the
    /// reviewer's feedback, up to the gate's regeneration budget.
    /// Cancellation fails the run without further external calls.
    pub async fn resume(&self, run_id: Uuid, resume_data: &Value) -> Result<WorkflowRun, EngineError> {
        let mut run = self.status(run_id).await?;
        if run.status != WorkflowRunStatus::Suspended {
            return Err(EngineError::RunNotResumable { status: run.status });
        }

        let definition = self.definition_for(&run)?;
        let step_id = run
            .current_step
            .clone()
            .ok_or_else(|| EngineError::Internal(format!("suspended run {run_id} has no current step")))?;
        let index = definition
            .step_index(&step_id)
            .ok_or_else(|| EngineError::Internal(format!("unknown step '{step_id}'")))?;
        let step = &definition.steps[index];
        let gate = step
            .review
            .as_ref()
            .ok_or_else(|| EngineError::Internal(format!("step '{step_id}' has no review gate")))?;

        let decision = parse_resume(gate, resume_data).map_err(EngineError::ResumeMismatch)?;
        let language = run_language(&run)?;

        match decision {
            ResumeDecision::Approve => {
                let payload = run.suspend_data.take().ok_or_else(|| {
                    EngineError::Internal(format!("suspended run {run_id} has no payload"))
                })?;
                run.status = WorkflowRunStatus::Running;
                self.checkpoint.step_completed(&mut run, &step_id, payload).await?;
                tracing::info!(run_id = %run.id, step = %step_id, "review approved");

                self.drive(&mut run, definition, language, index + 1, None)
                    .await?;
            }
            ResumeDecision::Reject { feedback } => {
                if run.regenerations >= gate.max_regenerations {
                    tracing::info!(
                        run_id = %run.id,
                        step = %step_id,
                        regenerations = run.regenerations,
                        "review rejected with no regenerations left"
                    );
                    let error = ErrorInfo {
                        category: ErrorCategory::RegenerationLimit,
                        message: format!(
                            "step was rejected after {} regenerations",
                            gate.max_regenerations
                        ),
                        step_id: Some(step_id),
                    };
                    self.fail(&mut run, error).await?;
                    return Ok(run);
                }

                run.regenerations += 1;
                run.suspend_data = None;
                tracing::info!(
                    run_id = %run.id,
                    step = %step_id,
                    regeneration = run.regenerations,
                    with_feedback = feedback.is_some(),
                    "review rejected, regenerating"
                );
                self.drive(&mut run, definition, language, index, feedback)
                    .await?;
            }
            ResumeDecision::Cancel => {
                let error = ErrorInfo {
                    category: ErrorCategory::Cancelled,
                    message: "run was cancelled by the reviewer".to_string(),
                    step_id: Some(step_id),
                };
                self.fail(&mut run, error).await?;
            }
        }

        Ok(run)
    }

    /// Runs newest first, optionally filtered by status.
    pub async fn list_runs(
        &self,
        status: Option<WorkflowRunStatus>,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, EngineError> {
        Ok(self.checkpoint.repo().list_runs(status, limit).await?)
    }

    /// Fail every SUSPENDED run that has not changed for `older_than`.
    /// Returns the ids of the expired runs. Runs that change while the
    /// sweep is in progress are skipped.
    pub async fn expire_suspended(&self, older_than: Duration) -> Result<Vec<Uuid>, EngineError> {
        let older_than = chrono::Duration::from_std(older_than)
            .map_err(|e| EngineError::Internal(format!("expiry threshold: {e}")))?;
        let cutoff = Utc::now() - older_than;

        let suspended = self
            .checkpoint
            .repo()
            .list_runs(Some(WorkflowRunStatus::Suspended), u32::MAX)
            .await?;

        let mut expired = Vec::new();
        for mut run in suspended.into_iter().filter(|r| r.updated_at < cutoff) {
            let error = ErrorInfo {
                category: ErrorCategory::Expired,
                message: format!(
                    "no review decision within {} hours",
                    older_than.num_hours()
                ),
                step_id: run.current_step.clone(),
            };
            match self.checkpoint.failed(&mut run, error).await {
                Ok(()) => {
                    tracing::info!(run_id = %run.id, "expired suspended run");
                    expired.push(run.id);
                }
                Err(CheckpointError::Conflict(_)) => {
                    tracing::warn!(run_id = %run.id, "run changed during sweep, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(expired)
    }

    /// Fail every RUNNING run whose last checkpoint is older than the step
    /// timeout plus [`STALL_GRACE`]. A live run checkpoints at least once
    /// per step, so these were abandoned mid-step (process exit, lost
    /// task). Returns the ids of the failed runs.
    pub async fn fail_stalled(&self) -> Result<Vec<Uuid>, EngineError> {
        let threshold = chrono::Duration::from_std(self.step_timeout + STALL_GRACE)
            .map_err(|e| EngineError::Internal(format!("stall threshold: {e}")))?;
        let cutoff = Utc::now() - threshold;

        let running = self
            .checkpoint
            .repo()
            .list_runs(Some(WorkflowRunStatus::Running), u32::MAX)
            .await?;

        let mut stalled = Vec::new();
        for mut run in running.into_iter().filter(|r| r.updated_at < cutoff) {
            let error = ErrorInfo {
                category: ErrorCategory::Internal,
                message: "run stopped making progress".to_string(),
                step_id: run.current_step.clone(),
            };
            match self.checkpoint.failed(&mut run, error).await {
                Ok(()) => {
                    tracing::warn!(run_id = %run.id, "failed stalled run");
                    stalled.push(run.id);
                }
                Err(CheckpointError::Conflict(_)) => {
                    tracing::warn!(run_id = %run.id, "run changed during sweep, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(stalled)
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// [`Self::execute_from`], then make sure a failed checkpoint does not
    /// leave the run RUNNING. A concurrent writer owns the run, so conflicts
    /// are passed through untouched.
    async fn drive(
        &self,
        run: &mut WorkflowRun,
        definition: &WorkflowDefinition,
        language: Language,
        start: usize,
        feedback: Option<String>,
    ) -> Result<(), EngineError> {
        let result = self
            .execute_from(run, definition, language, start, feedback)
            .await;
        if let Err(e) = &result {
            if !matches!(e, EngineError::ConcurrentModification) {
                self.abandon(run, e).await;
            }
        }
        result
    }

    /// Best-effort FAILED write after an engine error. Keeps a failure
    /// record that could not be saved, otherwise records an internal error.
    async fn abandon(&self, run: &mut WorkflowRun, cause: &EngineError) {
        let pending = run.error_info.take();
        let error = match pending {
            Some(error) if run.status == WorkflowRunStatus::Failed => error,
            _ => ErrorInfo {
                category: ErrorCategory::Internal,
                message: "run state could not be saved".to_string(),
                step_id: run.current_step.clone(),
            },
        };

        match self.checkpoint.failed(run, error).await {
            Ok(()) => {
                tracing::error!(run_id = %run.id, error = %cause, "run failed after checkpoint error");
            }
            Err(e) => {
                tracing::error!(
                    run_id = %run.id,
                    error = %e,
                    cause = %cause,
                    "could not mark run failed; it stays RUNNING until swept"
                );
            }
        }
    }

    fn definition_for(&self, run: &WorkflowRun) -> Result<&WorkflowDefinition, EngineError> {
        self.registry.get(&run.workflow_name).ok_or_else(|| {
            EngineError::Internal(format!(
                "run {} references unregistered workflow '{}'",
                run.id, run.workflow_name
            ))
        })
    }

    /// Execute steps from `start` until the run suspends or terminates.
    /// `feedback` applies only to the first step executed.
    async fn execute_from(
        &self,
        run: &mut WorkflowRun,
        definition: &WorkflowDefinition,
        language: Language,
        start: usize,
        mut feedback: Option<String>,
    ) -> Result<(), EngineError> {
        for step in &definition.steps[start..] {
            self.checkpoint.step_started(run, &step.id).await?;

            let ctx = match StepContext::from_run(run, language, feedback.take()) {
                Ok(ctx) => ctx,
                Err(e) => return self.fail(run, step_failure(step, &e)).await,
            };

            tracing::debug!(run_id = %run.id, step = %step.id, "step started");
            let started = Instant::now();
            let outcome = tokio::time::timeout(self.step_timeout, self.runner.run(step, &ctx)).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let output = match outcome {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    tracing::error!(
                        run_id = %run.id,
                        step = %step.id,
                        error = %e,
                        elapsed_ms,
                        "step failed"
                    );
                    return self.fail(run, step_failure(step, &e)).await;
                }
                Err(_elapsed) => {
                    tracing::error!(
                        run_id = %run.id,
                        step = %step.id,
                        timeout_secs = self.step_timeout.as_secs(),
                        "step timed out"
                    );
                    let error = ErrorInfo {
                        category: ErrorCategory::StepTimeout,
                        message: format!(
                            "step did not finish within {} seconds",
                            self.step_timeout.as_secs()
                        ),
                        step_id: Some(step.id.clone()),
                    };
                    return self.fail(run, error).await;
                }
            };

            if step.review.is_some() {
                self.checkpoint.suspended(run, &step.id, output).await?;
                tracing::info!(run_id = %run.id, step = %step.id, elapsed_ms, "run suspended for review");
                return Ok(());
            }

            self.checkpoint.step_completed(run, &step.id, output).await?;
            tracing::debug!(run_id = %run.id, step = %step.id, elapsed_ms, "step completed");
        }

        let output = run
            .completed_step_outputs
            .last()
            .map(|r| r.output.clone())
            .unwrap_or(Value::Null);
        self.checkpoint.succeeded(run, output).await?;
        tracing::info!(run_id = %run.id, workflow = %run.workflow_name, "workflow run succeeded");
        Ok(())
    }

    async fn fail(&self, run: &mut WorkflowRun, error: ErrorInfo) -> Result<(), EngineError> {
        let category = error.category;
        self.checkpoint.failed(run, error).await?;
        tracing::error!(run_id = %run.id, category = ?category, "workflow run failed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Detached execution
// ---------------------------------------------------------------------------

impl<R: RunRepository + 'static> WorkflowEngine<R> {
    /// [`Self::trigger`] on its own task. Dropping the returned future
    /// (a disconnected HTTP client) does not stop the run midway.
    pub async fn trigger_detached(
        self: Arc<Self>,
        workflow_name: String,
        input: Value,
        owner_id: String,
    ) -> Result<WorkflowRun, EngineError> {
        let task =
            tokio::spawn(async move { self.trigger(&workflow_name, &input, &owner_id).await });
        task.await
            .map_err(|e| EngineError::Internal(format!("run task stopped: {e}")))?
    }

    /// [`Self::resume`] on its own task, for the same reason.
    pub async fn resume_detached(
        self: Arc<Self>,
        run_id: Uuid,
        resume_data: Value,
    ) -> Result<WorkflowRun, EngineError> {
        let task = tokio::spawn(async move { self.resume(run_id, &resume_data).await });
        task.await
            .map_err(|e| EngineError::Internal(format!("run task stopped: {e}")))?
    }
}

fn run_language(run: &WorkflowRun) -> Result<Language, EngineError> {
    let input: GenerationInput = serde_json::from_value(run.input_data.clone())
        .map_err(|e| EngineError::Internal(format!("stored input: {e}")))?;
    Language::from_str(&input.target_language).map_err(EngineError::Internal)
}

/// Map a step error to the caller-facing failure record. Messages never
/// carry provider payloads; the full error is logged instead.
fn step_failure(step: &StepDefinition, error: &StepError) -> ErrorInfo {
    let (category, message) = match error.root() {
        StepError::Analysis(_) => (
            ErrorCategory::Validation,
            "the reading text could not be analyzed for this language".to_string(),
        ),
        StepError::Refinement(RefinementError::Schema { attempts, .. }) => (
            ErrorCategory::ProviderPermanent,
            format!("generated content failed validation after {attempts} attempts"),
        ),
        StepError::Refinement(e @ RefinementError::Provider(_)) if e.is_transient() => (
            ErrorCategory::ProviderTransient,
            "the generation provider was unavailable after retries".to_string(),
        ),
        StepError::Refinement(RefinementError::Provider(_)) => (
            ErrorCategory::ProviderPermanent,
            "the generation provider rejected the request".to_string(),
        ),
        StepError::Join(_) => (
            ErrorCategory::StepFailed,
            "a step task stopped unexpectedly".to_string(),
        ),
        StepError::Corrupt(_) | StepError::Branch { .. } => (
            ErrorCategory::Internal,
            "stored run data could not be read".to_string(),
        ),
    };

    let message = match error {
        StepError::Branch { branch, .. } => format!("branch '{branch}': {message}"),
        _ => message,
    };

    ErrorInfo {
        category,
        message,
        step_id: Some(step.id.clone()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
