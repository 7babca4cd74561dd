//! SQLite run repository implementation.
//!
//! Implements `RunRepository` from `lexiflow-core` using sqlx with split
//! read/write pools. JSON-shaped fields are stored as serialized text; the
//! `version` column carries the optimistic concurrency token.

use lexiflow_core::repository::RunRepository;
use lexiflow_types::error::RepositoryError;
use lexiflow_types::workflow::{ErrorInfo, StepOutputRecord, WorkflowRun, WorkflowRunStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `RunRepository`.
pub struct SqliteRunRepository {
    pool: DatabasePool,
}

impl SqliteRunRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct WorkflowRunRow {
    id: String,
    workflow_name: String,
    status: String,
    current_step: Option<String>,
    input_data: String,
    completed_step_outputs: String,
    suspend_data: Option<String>,
    output_data: Option<String>,
    error_info: Option<String>,
    regenerations: i64,
    version: i64,
    owner_id: String,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

impl WorkflowRunRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            workflow_name: row.try_get("workflow_name")?,
            status: row.try_get("status")?,
            current_step: row.try_get("current_step")?,
            input_data: row.try_get("input_data")?,
            completed_step_outputs: row.try_get("completed_step_outputs")?,
            suspend_data: row.try_get("suspend_data")?,
            output_data: row.try_get("output_data")?,
            error_info: row.try_get("error_info")?,
            regenerations: row.try_get("regenerations")?,
            version: row.try_get("version")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }

    fn into_run(self) -> Result<WorkflowRun, RepositoryError> {
        let status: WorkflowRunStatus = self.status.parse().map_err(RepositoryError::Query)?;
        let completed_step_outputs: Vec<StepOutputRecord> =
            from_json("completed_step_outputs", &self.completed_step_outputs)?;
        let error_info: Option<ErrorInfo> = self
            .error_info
            .as_deref()
            .map(|s| from_json("error_info", s))
            .transpose()?;

        Ok(WorkflowRun {
            id: parse_uuid(&self.id)?,
            workflow_name: self.workflow_name,
            status,
            current_step: self.current_step,
            input_data: from_json("input_data", &self.input_data)?,
            completed_step_outputs,
            suspend_data: self
                .suspend_data
                .as_deref()
                .map(|s| from_json("suspend_data", s))
                .transpose()?,
            output_data: self
                .output_data
                .as_deref()
                .map(|s| from_json("output_data", s))
                .transpose()?,
            error_info,
            regenerations: u32::try_from(self.regenerations)
                .map_err(|e| RepositoryError::Query(format!("invalid regenerations: {e}")))?,
            version: u64::try_from(self.version)
                .map_err(|e| RepositoryError::Query(format!("invalid version: {e}")))?,
            owner_id: self.owner_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            completed_at: self
                .completed_at
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    s.parse::<Uuid>()
        .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn from_json<T: DeserializeOwned>(column: &str, s: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(s).map_err(|e| RepositoryError::Query(format!("invalid {column} JSON: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Query(e.to_string()))
}

fn to_json_opt<T: Serialize>(value: Option<&T>) -> Result<Option<String>, RepositoryError> {
    value.map(to_json).transpose()
}

fn to_i64(value: u64, column: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|e| RepositoryError::Query(format!("{column} out of range: {e}")))
}

// ---------------------------------------------------------------------------
// RunRepository implementation
// ---------------------------------------------------------------------------

impl RunRepository for SqliteRunRepository {
    async fn create_run(&self, run: &WorkflowRun) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO workflow_runs
               (id, workflow_name, status, current_step, input_data, completed_step_outputs,
                suspend_data, output_data, error_info, regenerations, version, owner_id,
                created_at, updated_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(run.id.to_string())
        .bind(&run.workflow_name)
        .bind(run.status.to_string())
        .bind(&run.current_step)
        .bind(to_json(&run.input_data)?)
        .bind(to_json(&run.completed_step_outputs)?)
        .bind(to_json_opt(run.suspend_data.as_ref())?)
        .bind(to_json_opt(run.output_data.as_ref())?)
        .bind(to_json_opt(run.error_info.as_ref())?)
        .bind(i64::from(run.regenerations))
        .bind(to_i64(run.version, "version")?)
        .bind(&run.owner_id)
        .bind(format_datetime(&run.created_at))
        .bind(format_datetime(&run.updated_at))
        .bind(run.completed_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                RepositoryError::Conflict(format!("run {} already exists", run.id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_run(&self, run_id: &Uuid) -> Result<Option<WorkflowRun>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM workflow_runs WHERE id = ?")
            .bind(run_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = WorkflowRunRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_run()?))
            }
            None => Ok(None),
        }
    }

    async fn update_run(&self, run: &WorkflowRun) -> Result<u64, RepositoryError> {
        let expected = to_i64(run.version, "version")?;

        let result = sqlx::query(
            r#"UPDATE workflow_runs
               SET status = ?, current_step = ?, completed_step_outputs = ?, suspend_data = ?,
                   output_data = ?, error_info = ?, regenerations = ?, updated_at = ?,
                   completed_at = ?, version = version + 1
               WHERE id = ? AND version = ?"#,
        )
        .bind(run.status.to_string())
        .bind(&run.current_step)
        .bind(to_json(&run.completed_step_outputs)?)
        .bind(to_json_opt(run.suspend_data.as_ref())?)
        .bind(to_json_opt(run.output_data.as_ref())?)
        .bind(to_json_opt(run.error_info.as_ref())?)
        .bind(i64::from(run.regenerations))
        .bind(format_datetime(&run.updated_at))
        .bind(run.completed_at.as_ref().map(format_datetime))
        .bind(run.id.to_string())
        .bind(expected)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(run.version + 1);
        }

        // Distinguish a missing run from a stale version.
        let current: Option<(i64,)> = sqlx::query_as("SELECT version FROM workflow_runs WHERE id = ?")
            .bind(run.id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match current {
            None => Err(RepositoryError::NotFound),
            Some((stored,)) => Err(RepositoryError::Conflict(format!(
                "run {} is at version {stored}, write expected {expected}",
                run.id
            ))),
        }
    }

    async fn list_runs(
        &self,
        status: Option<WorkflowRunStatus>,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, RepositoryError> {
        // UUIDv7 ids sort by creation time.
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM workflow_runs WHERE status = ? ORDER BY id DESC LIMIT ?")
                    .bind(status.to_string())
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM workflow_runs ORDER BY id DESC LIMIT ?")
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut runs = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = WorkflowRunRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            runs.push(r.into_run()?);
        }
        Ok(runs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lexiflow_types::workflow::ErrorCategory;
    use serde_json::json;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn sample_run() -> WorkflowRun {
        WorkflowRun::new(
            "vocabulary",
            json!({
                "readingText": "La casa es grande.",
                "targetLevel": "A1",
                "targetLanguage": "es",
                "maxItems": 5,
                "sourceReadingIds": ["r-1"]
            }),
            "alice",
        )
    }

    #[tokio::test]
    async fn test_create_and_get_run() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let run = sample_run();
        repo.create_run(&run).await.unwrap();

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, run.id);
        assert_eq!(loaded.status, WorkflowRunStatus::Pending);
        assert_eq!(loaded.input_data, run.input_data);
        assert_eq!(loaded.owner_id, "alice");
        assert_eq!(loaded.version, 0);
        assert!(loaded.completed_step_outputs.is_empty());

        assert!(repo.get_run(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let run = sample_run();
        repo.create_run(&run).await.unwrap();
        assert!(matches!(
            repo.create_run(&run).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_round_trips_all_fields() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let mut run = sample_run();
        repo.create_run(&run).await.unwrap();

        run.status = WorkflowRunStatus::Suspended;
        run.current_step = Some("generate-vocabulary".into());
        run.completed_step_outputs.push(StepOutputRecord {
            step_id: "extract-candidates".into(),
            output: json!({"candidates": []}),
        });
        run.suspend_data = Some(json!({"vocabulary": [{"word": "casa"}]}));
        run.regenerations = 2;
        run.updated_at = Utc::now();
        run.version = repo.update_run(&run).await.unwrap();
        assert_eq!(run.version, 1);

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded, run);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let run = sample_run();
        repo.create_run(&run).await.unwrap();

        let mut first = run.clone();
        first.status = WorkflowRunStatus::Running;
        repo.update_run(&first).await.unwrap();

        let mut second = run.clone();
        second.status = WorkflowRunStatus::Failed;
        second.error_info = Some(ErrorInfo {
            category: ErrorCategory::Cancelled,
            message: "cancelled".into(),
            step_id: None,
        });
        let err = repo.update_run(&second).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let loaded = repo.get_run(&run.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, WorkflowRunStatus::Running);
        assert!(loaded.error_info.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_run() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let run = sample_run();
        assert!(matches!(
            repo.update_run(&run).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_runs_filters_and_orders() {
        let repo = SqliteRunRepository::new(test_pool().await);
        let mut ids = Vec::new();
        for i in 0..3 {
            let mut run = sample_run();
            if i == 1 {
                run.status = WorkflowRunStatus::Suspended;
            }
            repo.create_run(&run).await.unwrap();
            ids.push(run.id);
        }

        let all = repo.list_runs(None, 10).await.unwrap();
        let listed: Vec<Uuid> = all.iter().map(|r| r.id).collect();
        let mut expected = ids.clone();
        expected.sort();
        expected.reverse();
        assert_eq!(listed, expected);

        let suspended = repo
            .list_runs(Some(WorkflowRunStatus::Suspended), 10)
            .await
            .unwrap();
        assert_eq!(suspended.len(), 1);
        assert_eq!(suspended[0].id, ids[1]);

        assert_eq!(repo.list_runs(None, 2).await.unwrap().len(), 2);
    }
}
