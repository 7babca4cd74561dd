//! Workflow domain types for lexiflow.
//!
//! Defines the shape of a workflow (`WorkflowDefinition` and its steps), the
//! typed trigger input, reviewer decisions, and the durable execution record
//! (`WorkflowRun`) that survives the gap between suspension and resume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::content::{CefrLevel, ItemKind};

// ---------------------------------------------------------------------------
// Workflow Definition
// ---------------------------------------------------------------------------

/// A named, ordered pipeline of steps.
///
/// Definitions are built in code at startup and never change while the
/// process runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Registry key, e.g. `"vocabulary"`.
    pub name: String,
    /// One-line description shown in listings.
    pub description: String,
    /// Constraints applied to trigger input.
    pub input_schema: InputSchema,
    /// Steps executed in declared order.
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Position of a step by id.
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }
}

/// Declared limits for trigger input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchema {
    /// Maximum reading text length, in characters.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Upper bound for `maxItems`.
    #[serde(default = "default_max_items")]
    pub max_items: u32,
    /// Whether at least one source reading id must be supplied.
    #[serde(default)]
    pub require_source_reading_ids: bool,
}

fn default_max_text_chars() -> usize {
    20_000
}

fn default_max_items() -> u32 {
    50
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            max_items: default_max_items(),
            require_source_reading_ids: false,
        }
    }
}

/// A single step in a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique identifier within the workflow (e.g. "generate-vocabulary").
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// What the step does.
    pub action: StepAction,
    /// When set, the step suspends for human review after computing its output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewGate>,
}

/// Step behaviour, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// Run the text analyzer over the reading text.
    ExtractCandidates {
        /// Number of candidates handed to later steps.
        max_candidates: usize,
    },
    /// Look up every extracted candidate in the dictionary router.
    EnrichCandidates,
    /// Ask the content refiner for items of one kind.
    Generate {
        kind: ItemKind,
        /// Extra instruction appended to the prompt (e.g. an exercise type).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        focus: Option<String>,
    },
    /// Run independent generation branches concurrently.
    Parallel { branches: Vec<BranchDefinition> },
    /// Merge the sections produced by earlier generation steps.
    Assemble,
}

impl StepAction {
    /// Whether this step produces content sections (as opposed to
    /// intermediate analysis data).
    pub fn produces_sections(&self) -> bool {
        matches!(self, StepAction::Generate { .. } | StepAction::Parallel { .. })
    }
}

/// One branch of a parallel group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchDefinition {
    /// Unique identifier within the group.
    pub id: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// Resume contract for a reviewed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewGate {
    /// Message shown to the reviewer alongside the payload.
    pub prompt: String,
    /// How many times a reviewer may reject and regenerate before the run fails.
    #[serde(default = "default_max_regenerations")]
    pub max_regenerations: u32,
    /// Maximum length of `userFeedback`, in characters.
    #[serde(default = "default_max_feedback_chars")]
    pub max_feedback_chars: usize,
}

fn default_max_regenerations() -> u32 {
    3
}

fn default_max_feedback_chars() -> usize {
    2_000
}

impl ReviewGate {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_regenerations: default_max_regenerations(),
            max_feedback_chars: default_max_feedback_chars(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger input and reviewer decisions
// ---------------------------------------------------------------------------

/// Validated trigger parameters, stored as the run's `inputData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationInput {
    pub reading_text: String,
    pub target_level: CefrLevel,
    /// Language code as supplied by the caller; validated on trigger.
    pub target_language: String,
    pub max_items: u32,
    #[serde(default)]
    pub source_reading_ids: Vec<String>,
}

/// What a reviewer decided for a suspended step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ResumeDecision {
    /// Accept the suspended payload verbatim.
    Approve,
    /// Regenerate the same step, optionally guided by feedback.
    Reject { feedback: Option<String> },
    /// Abandon the run.
    Cancel,
}

// ---------------------------------------------------------------------------
// Execution tracking
// ---------------------------------------------------------------------------

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowRunStatus {
    Pending,
    Running,
    Suspended,
    Success,
    Failed,
}

impl WorkflowRunStatus {
    /// SUCCESS and FAILED accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowRunStatus::Success | WorkflowRunStatus::Failed)
    }
}

impl fmt::Display for WorkflowRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowRunStatus::Pending => write!(f, "PENDING"),
            WorkflowRunStatus::Running => write!(f, "RUNNING"),
            WorkflowRunStatus::Suspended => write!(f, "SUSPENDED"),
            WorkflowRunStatus::Success => write!(f, "SUCCESS"),
            WorkflowRunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for WorkflowRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(WorkflowRunStatus::Pending),
            "RUNNING" => Ok(WorkflowRunStatus::Running),
            "SUSPENDED" => Ok(WorkflowRunStatus::Suspended),
            "SUCCESS" => Ok(WorkflowRunStatus::Success),
            "FAILED" => Ok(WorkflowRunStatus::Failed),
            other => Err(format!("invalid run status: '{other}'")),
        }
    }
}

/// Coarse failure class recorded on FAILED runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Validation,
    ProviderTransient,
    ProviderPermanent,
    StepFailed,
    StepTimeout,
    Cancelled,
    RegenerationLimit,
    Expired,
    Internal,
}

/// Failure details surfaced to callers. Never carries provider payloads or
/// stack traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

/// Output of one finished step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutputRecord {
    pub step_id: String,
    pub output: serde_json::Value,
}

/// One durable execution instance of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    /// UUIDv7 run identifier.
    pub id: Uuid,
    pub workflow_name: String,
    pub status: WorkflowRunStatus,
    /// Step being executed or awaiting review; `None` once terminal.
    pub current_step: Option<String>,
    /// Trigger parameters, immutable after creation.
    pub input_data: serde_json::Value,
    /// One record per finished step, in completion order.
    pub completed_step_outputs: Vec<StepOutputRecord>,
    /// Payload shown to the reviewer while SUSPENDED.
    pub suspend_data: Option<serde_json::Value>,
    /// Final result, set only on SUCCESS.
    pub output_data: Option<serde_json::Value>,
    /// Set only on FAILED.
    pub error_info: Option<ErrorInfo>,
    /// Rejections already spent on the current step.
    pub regenerations: u32,
    /// Optimistic concurrency token, bumped on every write.
    pub version: u64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// A fresh PENDING run.
    pub fn new(workflow_name: &str, input_data: serde_json::Value, owner_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            workflow_name: workflow_name.to_string(),
            status: WorkflowRunStatus::Pending,
            current_step: None,
            input_data,
            completed_step_outputs: Vec::new(),
            suspend_data: None,
            output_data: None,
            error_info: None,
            regenerations: 0,
            version: 0,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Output of a finished step by id.
    pub fn step_output(&self, step_id: &str) -> Option<&serde_json::Value> {
        self.completed_step_outputs
            .iter()
            .find(|r| r.step_id == step_id)
            .map(|r| &r.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_serde() {
        let json = serde_json::to_string(&WorkflowRunStatus::Suspended).unwrap();
        assert_eq!(json, "\"SUSPENDED\"");
        let parsed: WorkflowRunStatus = serde_json::from_str("\"SUCCESS\"").unwrap();
        assert_eq!(parsed, WorkflowRunStatus::Success);
    }

    #[test]
    fn test_run_status_roundtrip_and_terminal() {
        for status in [
            WorkflowRunStatus::Pending,
            WorkflowRunStatus::Running,
            WorkflowRunStatus::Suspended,
            WorkflowRunStatus::Success,
            WorkflowRunStatus::Failed,
        ] {
            let parsed: WorkflowRunStatus = status.to_string().parse().unwrap();
            assert_eq!(status, parsed);
        }
        assert!(WorkflowRunStatus::Success.is_terminal());
        assert!(WorkflowRunStatus::Failed.is_terminal());
        assert!(!WorkflowRunStatus::Suspended.is_terminal());
    }

    #[test]
    fn test_step_action_serde() {
        let action = StepAction::Generate {
            kind: ItemKind::Exercise,
            focus: Some("fill_in_blank".to_string()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "generate");
        assert_eq!(json["kind"], "exercise");

        let parsed: StepAction =
            serde_json::from_value(serde_json::json!({"type": "extract_candidates", "max_candidates": 20}))
                .unwrap();
        assert!(matches!(parsed, StepAction::ExtractCandidates { max_candidates: 20 }));
    }

    #[test]
    fn test_generation_input_serde() {
        let json = serde_json::json!({
            "readingText": "El gato duerme.",
            "targetLevel": "A2",
            "targetLanguage": "es",
            "maxItems": 5,
            "sourceReadingIds": ["r-1"]
        });
        let input: GenerationInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.target_level, CefrLevel::A2);
        assert_eq!(input.source_reading_ids, vec!["r-1"]);
    }

    #[test]
    fn test_generation_input_rejects_unknown_field() {
        let json = serde_json::json!({
            "readingText": "x",
            "targetLevel": "A2",
            "targetLanguage": "es",
            "maxItems": 5,
            "bogus": true
        });
        assert!(serde_json::from_value::<GenerationInput>(json).is_err());
    }

    #[test]
    fn test_new_run_defaults() {
        let run = WorkflowRun::new("vocabulary", serde_json::json!({}), "alice");
        assert_eq!(run.status, WorkflowRunStatus::Pending);
        assert_eq!(run.version, 0);
        assert!(run.completed_step_outputs.is_empty());
        assert_eq!(run.created_at, run.updated_at);
    }

    #[test]
    fn test_run_serde_camel_case() {
        let mut run = WorkflowRun::new("vocabulary", serde_json::json!({"a": 1}), "alice");
        run.error_info = Some(ErrorInfo {
            category: ErrorCategory::ProviderPermanent,
            message: "schema".into(),
            step_id: Some("generate-vocabulary".into()),
        });
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["workflowName"], "vocabulary");
        assert_eq!(json["errorInfo"]["category"], "PROVIDER_PERMANENT");
        assert_eq!(json["errorInfo"]["stepId"], "generate-vocabulary");
        let back: WorkflowRun = serde_json::from_value(json).unwrap();
        assert_eq!(back, run);
    }
}
