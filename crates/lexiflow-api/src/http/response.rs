//! Response bodies for the REST API.
//!
//! Run-shaped responses share one projection of `WorkflowRun`:
//! ```json
//! { "runId": "...", "status": "SUSPENDED", "currentStep": "...", "data": { ... } }
//! ```
//! `data` is `suspendData` while SUSPENDED, `outputData` once SUCCESS, and
//! `null` otherwise. FAILED runs add `errorInfo`.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use lexiflow_types::analysis::{Candidate, WordAnalysis};
use lexiflow_types::workflow::{ErrorInfo, WorkflowDefinition, WorkflowRun, WorkflowRunStatus};

/// Caller-facing view of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub run_id: Uuid,
    pub status: WorkflowRunStatus,
    pub current_step: Option<String>,
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_info: Option<ErrorInfo>,
}

impl From<&WorkflowRun> for RunResponse {
    fn from(run: &WorkflowRun) -> Self {
        let data = match run.status {
            WorkflowRunStatus::Suspended => run.suspend_data.clone(),
            WorkflowRunStatus::Success => run.output_data.clone(),
            _ => None,
        };
        Self {
            run_id: run.id,
            status: run.status,
            current_step: run.current_step.clone(),
            data,
            error_info: run.error_info.clone(),
        }
    }
}

/// Entry in the workflow listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub name: String,
    pub description: String,
    pub steps: Vec<String>,
}

impl From<&WorkflowDefinition> for WorkflowSummary {
    fn from(def: &WorkflowDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            steps: def.steps.iter().map(|s| s.id.clone()).collect(),
        }
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub words: Vec<WordAnalysis>,
    pub candidates: Vec<Candidate>,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn failure(raw_text: String, error: String) -> Self {
        Self {
            success: false,
            words: Vec::new(),
            candidates: Vec::new(),
            raw_text,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexiflow_types::workflow::ErrorCategory;
    use serde_json::json;

    fn run() -> WorkflowRun {
        WorkflowRun::new("vocabulary", json!({}), "anonymous")
    }

    #[test]
    fn test_suspended_run_exposes_suspend_data() {
        let mut run = run();
        run.status = WorkflowRunStatus::Suspended;
        run.current_step = Some("generate-vocabulary".into());
        run.suspend_data = Some(json!({"vocabulary": [{"word": "casa"}]}));

        let body = serde_json::to_value(RunResponse::from(&run)).unwrap();
        assert_eq!(body["status"], "SUSPENDED");
        assert_eq!(body["currentStep"], "generate-vocabulary");
        assert_eq!(body["data"]["vocabulary"][0]["word"], "casa");
        assert!(body.get("errorInfo").is_none());
    }

    #[test]
    fn test_success_run_exposes_output_data() {
        let mut run = run();
        run.status = WorkflowRunStatus::Success;
        run.output_data = Some(json!({"vocabulary": []}));
        run.suspend_data = Some(json!({"stale": true}));

        let response = RunResponse::from(&run);
        assert_eq!(response.data, Some(json!({"vocabulary": []})));
        assert_eq!(response.current_step, None);
    }

    #[test]
    fn test_failed_run_carries_error_info_and_null_data() {
        let mut run = run();
        run.status = WorkflowRunStatus::Failed;
        run.error_info = Some(ErrorInfo {
            category: ErrorCategory::Cancelled,
            message: "cancelled by reviewer".into(),
            step_id: Some("generate-vocabulary".into()),
        });

        let body = serde_json::to_value(RunResponse::from(&run)).unwrap();
        assert!(body["data"].is_null());
        assert_eq!(body["errorInfo"]["category"], "CANCELLED");
        assert_eq!(body["errorInfo"]["stepId"], "generate-vocabulary");
    }

    #[test]
    fn test_analyze_failure_shape() {
        let body =
            serde_json::to_value(AnalyzeResponse::failure("hola".into(), "unsupported".into()))
                .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["rawText"], "hola");
        assert_eq!(body["error"], "unsupported");
        assert!(body["words"].as_array().unwrap().is_empty());
    }
}
