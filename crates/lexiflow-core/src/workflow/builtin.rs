//! Workflows shipped with lexiflow.

use lexiflow_types::content::ItemKind;
use lexiflow_types::workflow::{
    BranchDefinition, InputSchema, ReviewGate, StepAction, StepDefinition, WorkflowDefinition,
};

pub const VOCABULARY_WORKFLOW: &str = "vocabulary";
pub const LESSON_WORKFLOW: &str = "lesson";

/// Candidates handed from extraction to enrichment and generation.
pub const DEFAULT_MAX_CANDIDATES: usize = 30;

fn extract_step() -> StepDefinition {
    StepDefinition {
        id: "extract-candidates".to_string(),
        name: "Extract candidates".to_string(),
        action: StepAction::ExtractCandidates {
            max_candidates: DEFAULT_MAX_CANDIDATES,
        },
        review: None,
    }
}

fn enrich_step() -> StepDefinition {
    StepDefinition {
        id: "enrich-candidates".to_string(),
        name: "Look up candidates".to_string(),
        action: StepAction::EnrichCandidates,
        review: None,
    }
}

fn vocabulary_step(max_regenerations: u32) -> StepDefinition {
    StepDefinition {
        id: "generate-vocabulary".to_string(),
        name: "Generate vocabulary".to_string(),
        action: StepAction::Generate {
            kind: ItemKind::Vocabulary,
            focus: None,
        },
        review: Some(ReviewGate {
            max_regenerations,
            ..ReviewGate::new("Review the vocabulary list before it is saved.")
        }),
    }
}

/// extract-candidates -> enrich-candidates -> generate-vocabulary (reviewed).
pub fn vocabulary_workflow(max_regenerations: u32) -> WorkflowDefinition {
    WorkflowDefinition {
        name: VOCABULARY_WORKFLOW.to_string(),
        description: "Vocabulary list from a reading text, reviewed before saving".to_string(),
        input_schema: InputSchema::default(),
        steps: vec![extract_step(), enrich_step(), vocabulary_step(max_regenerations)],
    }
}

/// The vocabulary pipeline followed by a reviewed parallel practice group
/// (exercises, grammar, dialog) and a final assembly step.
pub fn lesson_workflow(max_regenerations: u32) -> WorkflowDefinition {
    let practice = StepDefinition {
        id: "generate-practice".to_string(),
        name: "Generate practice material".to_string(),
        action: StepAction::Parallel {
            branches: vec![
                BranchDefinition {
                    id: "exercises".to_string(),
                    kind: ItemKind::Exercise,
                    focus: Some(
                        "Mix fill_in_blank and multiple_choice exercises.".to_string(),
                    ),
                },
                BranchDefinition {
                    id: "grammar".to_string(),
                    kind: ItemKind::Grammar,
                    focus: None,
                },
                BranchDefinition {
                    id: "dialog".to_string(),
                    kind: ItemKind::Dialog,
                    focus: Some("Two speakers, alternating turns.".to_string()),
                },
            ],
        },
        review: Some(ReviewGate {
            max_regenerations,
            ..ReviewGate::new("Review the exercises, grammar notes and dialog.")
        }),
    };

    let assemble = StepDefinition {
        id: "assemble-lesson".to_string(),
        name: "Assemble lesson".to_string(),
        action: StepAction::Assemble,
        review: None,
    };

    WorkflowDefinition {
        name: LESSON_WORKFLOW.to_string(),
        description: "Full lesson: vocabulary, exercises, grammar and dialog".to_string(),
        input_schema: InputSchema::default(),
        steps: vec![
            extract_step(),
            enrich_step(),
            vocabulary_step(max_regenerations),
            practice,
            assemble,
        ],
    }
}

pub fn builtin_workflows(max_regenerations: u32) -> Vec<WorkflowDefinition> {
    vec![
        vocabulary_workflow(max_regenerations),
        lesson_workflow(max_regenerations),
    ]
}
