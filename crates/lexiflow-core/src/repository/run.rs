//! Run repository trait definition.

use lexiflow_types::error::RepositoryError;
use lexiflow_types::workflow::{WorkflowRun, WorkflowRunStatus};
use uuid::Uuid;

/// Durable storage for workflow runs.
///
/// Writes are guarded by the run's `version` field: `update_run` only
/// applies when the stored version equals `run.version`, and the stored
/// version is bumped by one on success. A stale write fails with
/// [`RepositoryError::Conflict`] and changes nothing.
pub trait RunRepository: Send + Sync {
    /// Insert a new run. The run's version is stored as given.
    fn create_run(
        &self,
        run: &WorkflowRun,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a run by its UUID.
    fn get_run(
        &self,
        run_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<WorkflowRun>, RepositoryError>> + Send;

    /// Replace a run, returning the new version.
    ///
    /// `run.version` is the version the caller last read.
    fn update_run(
        &self,
        run: &WorkflowRun,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// List runs newest first, optionally filtered by status.
    fn list_runs(
        &self,
        status: Option<WorkflowRunStatus>,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<WorkflowRun>, RepositoryError>> + Send;
}
