//! Workflow trigger, status and resume handlers.
//!
//! - `POST /workflows/trigger` body `{ workflowName, ...input }`
//! - `GET  /workflows/{run_id}/status`
//! - `POST /workflows/{run_id}/resume` body `{ resumeData }`
//! - `GET  /workflows` lists registered workflows

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::http::extractors::owner::OwnerId;
use crate::http::response::{RunResponse, WorkflowSummary};
use crate::state::AppState;

/// Field of the trigger body naming the workflow; everything else is input.
const WORKFLOW_NAME_FIELD: &str = "workflowName";

/// Body of `POST /workflows/{run_id}/resume`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResumeBody {
    pub resume_data: Value,
}

/// Split a trigger body into the workflow name and the input object.
pub fn split_trigger_body(body: Value) -> Result<(String, Value), AppError> {
    let Value::Object(mut fields) = body else {
        return Err(AppError::Validation("Request body must be a JSON object".to_string()));
    };

    let name = match fields.remove(WORKFLOW_NAME_FIELD) {
        Some(Value::String(name)) if !name.trim().is_empty() => name,
        Some(_) => {
            return Err(AppError::Validation(
                "workflowName must be a non-empty string".to_string(),
            ));
        }
        None => return Err(AppError::Validation("workflowName is required".to_string())),
    };

    Ok((name, Value::Object(fields)))
}

/// POST /workflows/trigger - Validate input, create a run and drive it
/// until it suspends or terminates.
pub async fn trigger_workflow(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<RunResponse>, AppError> {
    if !state.generation_ready {
        return Err(AppError::Unavailable(
            "Content generation is not configured on this server".to_string(),
        ));
    }

    let (name, input) = split_trigger_body(body)?;
    // Detached so a client disconnect cannot stop the run between steps.
    let run = Arc::clone(&state.engine)
        .trigger_detached(name, input, owner)
        .await?;

    Ok(Json(RunResponse::from(&run)))
}

/// GET /workflows/{run_id}/status - Read-only run view.
pub async fn get_status(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunResponse>, AppError> {
    let run = state.engine.status(run_id).await?;
    Ok(Json(RunResponse::from(&run)))
}

/// POST /workflows/{run_id}/resume - Apply a reviewer decision.
pub async fn resume_workflow(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    ApiJson(body): ApiJson<ResumeBody>,
) -> Result<Json<RunResponse>, AppError> {
    let run = Arc::clone(&state.engine)
        .resume_detached(run_id, body.resume_data)
        .await?;
    Ok(Json(RunResponse::from(&run)))
}

/// GET /workflows - Registered workflow definitions.
pub async fn list_workflows(State(state): State<AppState>) -> Json<Vec<WorkflowSummary>> {
    Json(
        state
            .engine
            .registry()
            .iter()
            .map(WorkflowSummary::from)
            .collect(),
    )
}
