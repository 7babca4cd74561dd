//! Workflow definition validation plus the trigger-input and resume-data
//! contracts each workflow declares.

use std::collections::HashSet;
use std::str::FromStr;

use lexiflow_types::language::Language;
use lexiflow_types::workflow::{
    GenerationInput, InputSchema, ResumeDecision, ReviewGate, StepAction, WorkflowDefinition,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A workflow definition is structurally invalid.
#[derive(Debug, Error)]
#[error("invalid workflow definition: {0}")]
pub struct DefinitionError(pub String);

/// Trigger input rejected before any run is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    UnsupportedLanguage(String),
}

// ---------------------------------------------------------------------------
// Definition validation
// ---------------------------------------------------------------------------

/// Check the structural constraints the engine relies on: a well-formed
/// name, at least one step, unique step ids, and non-empty parallel groups
/// with unique branch ids.
pub fn validate_definition(def: &WorkflowDefinition) -> Result<(), DefinitionError> {
    if def.name.is_empty() {
        return Err(DefinitionError("workflow name must not be empty".to_string()));
    }
    if !def.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(DefinitionError(format!(
            "workflow name '{}' contains invalid characters (only alphanumeric and hyphens allowed)",
            def.name
        )));
    }
    if def.steps.is_empty() {
        return Err(DefinitionError(format!(
            "workflow '{}' must have at least one step",
            def.name
        )));
    }

    let mut seen_ids = HashSet::new();
    for step in &def.steps {
        if !seen_ids.insert(step.id.as_str()) {
            return Err(DefinitionError(format!("duplicate step ID: '{}'", step.id)));
        }

        if let StepAction::Parallel { branches } = &step.action {
            if branches.is_empty() {
                return Err(DefinitionError(format!(
                    "parallel step '{}' has no branches",
                    step.id
                )));
            }
            let mut branch_ids = HashSet::new();
            for branch in branches {
                if !branch_ids.insert(branch.id.as_str()) {
                    return Err(DefinitionError(format!(
                        "parallel step '{}' has duplicate branch '{}'",
                        step.id, branch.id
                    )));
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Trigger input
// ---------------------------------------------------------------------------

/// Trigger input that passed validation, with its language resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub input: GenerationInput,
    pub language: Language,
}

/// Validate raw trigger parameters against a workflow's input schema.
pub fn validate_input(schema: &InputSchema, raw: &Value) -> Result<ValidatedInput, InputError> {
    if !raw.is_object() {
        return Err(InputError::Invalid("input must be a JSON object".to_string()));
    }
    let input: GenerationInput = serde_json::from_value(raw.clone())
        .map_err(|e| InputError::Invalid(format!("invalid input: {e}")))?;

    if input.reading_text.trim().is_empty() {
        return Err(InputError::Invalid("readingText must not be empty".to_string()));
    }
    let text_chars = input.reading_text.chars().count();
    if text_chars > schema.max_text_chars {
        return Err(InputError::Invalid(format!(
            "readingText is {text_chars} characters, maximum is {}",
            schema.max_text_chars
        )));
    }
    if input.max_items == 0 || input.max_items > schema.max_items {
        return Err(InputError::Invalid(format!(
            "maxItems must be between 1 and {}",
            schema.max_items
        )));
    }
    if schema.require_source_reading_ids && input.source_reading_ids.is_empty() {
        return Err(InputError::Invalid(
            "sourceReadingIds must contain at least one id".to_string(),
        ));
    }
    if input.source_reading_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(InputError::Invalid(
            "sourceReadingIds must not contain empty ids".to_string(),
        ));
    }

    let language =
        Language::from_str(&input.target_language).map_err(InputError::UnsupportedLanguage)?;

    Ok(ValidatedInput { input, language })
}

// ---------------------------------------------------------------------------
// Resume data
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ApprovalPayload {
    approved: bool,
    #[serde(default)]
    user_feedback: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CancelPayload {
    cancel: bool,
}

/// Parse `resumeData` against a review gate.
///
/// Accepts `{approved, userFeedback?}` or `{cancel: true}`. The error string
/// explains the mismatch and is safe to return to the caller.
pub fn parse_resume(gate: &ReviewGate, raw: &Value) -> Result<ResumeDecision, String> {
    let Some(object) = raw.as_object() else {
        return Err("resumeData must be a JSON object".to_string());
    };

    if object.contains_key("cancel") {
        let payload: CancelPayload =
            serde_json::from_value(raw.clone()).map_err(|e| format!("invalid resumeData: {e}"))?;
        if !payload.cancel {
            return Err("cancel must be true when present".to_string());
        }
        return Ok(ResumeDecision::Cancel);
    }

    let payload: ApprovalPayload =
        serde_json::from_value(raw.clone()).map_err(|e| format!("invalid resumeData: {e}"))?;

    if let Some(feedback) = &payload.user_feedback {
        let chars = feedback.chars().count();
        if chars > gate.max_feedback_chars {
            return Err(format!(
                "userFeedback is {chars} characters, maximum is {}",
                gate.max_feedback_chars
            ));
        }
    }

    if payload.approved {
        Ok(ResumeDecision::Approve)
    } else {
        let feedback = payload
            .user_feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        Ok(ResumeDecision::Reject { feedback })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
