//! Durable checkpoints for workflow runs.
//!
//! Wraps `RunRepository` with the transitions the engine performs. Every
//! transition is written before the engine moves on, so a run can be
//! reloaded and continued from `currentStep` at any point.

use chrono::Utc;
use lexiflow_types::error::RepositoryError;
use lexiflow_types::workflow::{
    ErrorInfo, StepOutputRecord, WorkflowRun, WorkflowRunStatus,
};
use serde_json::Value;

use crate::repository::RunRepository;

// ---------------------------------------------------------------------------
// CheckpointManager
// ---------------------------------------------------------------------------

/// Applies state transitions to a run and persists them with an
/// optimistic version check.
///
/// Generic over `R: RunRepository` so it works with any storage backend.
/// On success the in-memory run carries the new version; on a stale write
/// its version and `updatedAt` are left untouched.
pub struct CheckpointManager<R: RunRepository> {
    repo: R,
}

impl<R: RunRepository> CheckpointManager<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Persist whatever has been changed on `run`.
    pub async fn save(&self, run: &mut WorkflowRun) -> Result<(), CheckpointError> {
        let previous = run.updated_at;
        run.updated_at = Utc::now();
        match self.repo.update_run(run).await {
            Ok(version) => {
                run.version = version;
                tracing::debug!(
                    run_id = %run.id,
                    status = %run.status,
                    step = run.current_step.as_deref().unwrap_or("-"),
                    version,
                    "checkpointed run"
                );
                Ok(())
            }
            Err(e) => {
                run.updated_at = previous;
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// RUNNING at `step_id`.
    pub async fn step_started(
        &self,
        run: &mut WorkflowRun,
        step_id: &str,
    ) -> Result<(), CheckpointError> {
        run.status = WorkflowRunStatus::Running;
        run.current_step = Some(step_id.to_string());
        self.save(run).await
    }

    /// Record a finished step and clear any review state.
    pub async fn step_completed(
        &self,
        run: &mut WorkflowRun,
        step_id: &str,
        output: Value,
    ) -> Result<(), CheckpointError> {
        run.completed_step_outputs.push(StepOutputRecord {
            step_id: step_id.to_string(),
            output,
        });
        run.suspend_data = None;
        run.regenerations = 0;
        self.save(run).await
    }

    /// SUSPENDED at `step_id` with `payload` awaiting review.
    pub async fn suspended(
        &self,
        run: &mut WorkflowRun,
        step_id: &str,
        payload: Value,
    ) -> Result<(), CheckpointError> {
        run.status = WorkflowRunStatus::Suspended;
        run.current_step = Some(step_id.to_string());
        run.suspend_data = Some(payload);
        self.save(run).await
    }

    /// SUCCESS with the final output.
    pub async fn succeeded(
        &self,
        run: &mut WorkflowRun,
        output: Value,
    ) -> Result<(), CheckpointError> {
        run.status = WorkflowRunStatus::Success;
        run.current_step = None;
        run.suspend_data = None;
        run.output_data = Some(output);
        run.completed_at = Some(Utc::now());
        self.save(run).await
    }

    /// FAILED with `error`. `currentStep` is kept for diagnosis.
    pub async fn failed(
        &self,
        run: &mut WorkflowRun,
        error: ErrorInfo,
    ) -> Result<(), CheckpointError> {
        run.status = WorkflowRunStatus::Failed;
        run.suspend_data = None;
        run.output_data = None;
        run.error_info = Some(error);
        run.completed_at = Some(Utc::now());
        self.save(run).await
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Another writer moved the run on since it was loaded.
    #[error("run was modified concurrently: {0}")]
    Conflict(String),

    #[error("checkpoint repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CheckpointError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(msg) => CheckpointError::Conflict(msg),
            other => CheckpointError::Repository(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRunRepository;
    use lexiflow_types::workflow::ErrorCategory;
    use serde_json::json;

    async fn setup() -> (CheckpointManager<InMemoryRunRepository>, WorkflowRun) {
        let checkpoint = CheckpointManager::new(InMemoryRunRepository::new());
        let run = WorkflowRun::new("vocabulary", json!({}), "alice");
        checkpoint.repo().create_run(&run).await.unwrap();
        (checkpoint, run)
    }

    #[tokio::test]
    async fn test_transitions_bump_version() {
        let (checkpoint, mut run) = setup().await;

        checkpoint.step_started(&mut run, "a").await.unwrap();
        checkpoint.step_completed(&mut run, "a", json!({"x": 1})).await.unwrap();
        checkpoint.suspended(&mut run, "b", json!({"y": 2})).await.unwrap();
        assert_eq!(run.version, 3);

        let stored = checkpoint.repo().get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(stored, run);
        assert_eq!(stored.status, WorkflowRunStatus::Suspended);
        assert_eq!(stored.step_output("a"), Some(&json!({"x": 1})));
    }

    #[tokio::test]
    async fn test_stale_copy_conflicts_and_is_untouched() {
        let (checkpoint, mut run) = setup().await;
        let mut stale = run.clone();

        checkpoint.step_started(&mut run, "a").await.unwrap();

        let before = stale.clone();
        let err = checkpoint
            .failed(
                &mut stale,
                ErrorInfo {
                    category: ErrorCategory::Cancelled,
                    message: "cancelled".into(),
                    step_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CheckpointError::Conflict(_)));
        assert_eq!(stale.version, before.version);
        assert_eq!(stale.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_succeeded_sets_terminal_fields() {
        let (checkpoint, mut run) = setup().await;
        checkpoint.succeeded(&mut run, json!({"vocabulary": []})).await.unwrap();
        assert_eq!(run.status, WorkflowRunStatus::Success);
        assert!(run.completed_at.is_some());
        assert!(run.current_step.is_none());
        assert_eq!(run.output_data, Some(json!({"vocabulary": []})));
    }
}
