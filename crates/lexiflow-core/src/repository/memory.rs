//! In-process run repository, used by the engine tests and embedders
//! that do not need durability.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lexiflow_types::error::RepositoryError;
use lexiflow_types::workflow::{WorkflowRun, WorkflowRunStatus};
use uuid::Uuid;

use super::run::RunRepository;

/// `RunRepository` backed by a `DashMap`.
///
/// The version check and the write happen under the same shard lock, so
/// concurrent updates of one run are serialized.
#[derive(Debug, Default)]
pub struct InMemoryRunRepository {
    runs: DashMap<Uuid, WorkflowRun>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunRepository for InMemoryRunRepository {
    async fn create_run(&self, run: &WorkflowRun) -> Result<(), RepositoryError> {
        match self.runs.entry(run.id) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "run {} already exists",
                run.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(run.clone());
                Ok(())
            }
        }
    }

    async fn get_run(&self, run_id: &Uuid) -> Result<Option<WorkflowRun>, RepositoryError> {
        Ok(self.runs.get(run_id).map(|r| r.value().clone()))
    }

    async fn update_run(&self, run: &WorkflowRun) -> Result<u64, RepositoryError> {
        let mut stored = self.runs.get_mut(&run.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != run.version {
            return Err(RepositoryError::Conflict(format!(
                "run {} is at version {}, write expected {}",
                run.id, stored.version, run.version
            )));
        }
        let mut next = run.clone();
        next.version = run.version + 1;
        let version = next.version;
        *stored = next;
        Ok(version)
    }

    async fn list_runs(
        &self,
        status: Option<WorkflowRunStatus>,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, RepositoryError> {
        let mut runs: Vec<WorkflowRun> = self
            .runs
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .map(|r| r.value().clone())
            .collect();
        // UUIDv7 ids sort by creation time.
        runs.sort_by(|a, b| b.id.cmp(&a.id));
        runs.truncate(limit as usize);
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryRunRepository::new();
        let run = WorkflowRun::new("vocabulary", json!({}), "alice");
        repo.create_run(&run).await.unwrap();

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded, run);
        assert!(repo.get_run(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let repo = InMemoryRunRepository::new();
        let run = WorkflowRun::new("vocabulary", json!({}), "alice");
        repo.create_run(&run).await.unwrap();
        assert!(matches!(
            repo.create_run(&run).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let repo = InMemoryRunRepository::new();
        let mut run = WorkflowRun::new("vocabulary", json!({}), "alice");
        repo.create_run(&run).await.unwrap();

        run.status = WorkflowRunStatus::Running;
        run.version = repo.update_run(&run).await.unwrap();
        assert_eq!(run.version, 1);

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowRunStatus::Running);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_update_rejected() {
        let repo = InMemoryRunRepository::new();
        let run = WorkflowRun::new("vocabulary", json!({}), "alice");
        repo.create_run(&run).await.unwrap();

        let mut first = run.clone();
        first.status = WorkflowRunStatus::Running;
        repo.update_run(&first).await.unwrap();

        let mut second = run.clone();
        second.status = WorkflowRunStatus::Failed;
        let err = repo.update_run(&second).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowRunStatus::Running);
    }

    #[tokio::test]
    async fn test_update_missing_run() {
        let repo = InMemoryRunRepository::new();
        let run = WorkflowRun::new("vocabulary", json!({}), "alice");
        assert!(matches!(
            repo.update_run(&run).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_limits() {
        let repo = InMemoryRunRepository::new();
        for i in 0..4 {
            let mut run = WorkflowRun::new("vocabulary", json!({ "i": i }), "alice");
            if i % 2 == 0 {
                run.status = WorkflowRunStatus::Suspended;
            }
            repo.create_run(&run).await.unwrap();
        }

        let suspended = repo
            .list_runs(Some(WorkflowRunStatus::Suspended), 10)
            .await
            .unwrap();
        assert_eq!(suspended.len(), 2);
        assert!(suspended.iter().all(|r| r.status == WorkflowRunStatus::Suspended));

        let limited = repo.list_runs(None, 3).await.unwrap();
        assert_eq!(limited.len(), 3);
        assert!(limited[0].id > limited[1].id);
    }
}
