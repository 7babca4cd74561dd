//! Per-step view of a run: the validated input plus the outputs of the
//! steps that already finished.

use lexiflow_types::analysis::Candidate;
use lexiflow_types::dictionary::DictionaryEntry;
use lexiflow_types::language::Language;
use lexiflow_types::workflow::{GenerationInput, WorkflowRun};
use serde_json::{Map, Value};

use super::step_runner::StepError;

/// Output key of the extraction step.
pub const CANDIDATES_KEY: &str = "candidates";
/// Output key of the enrichment step.
pub const ENTRIES_KEY: &str = "entries";

/// Everything a step reads. Rebuilt from the persisted run before each
/// step, so a resumed run sees exactly what an uninterrupted one would.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub input: GenerationInput,
    pub language: Language,
    pub candidates: Vec<Candidate>,
    pub entries: Vec<DictionaryEntry>,
    /// Content sections from earlier generation steps, in step order.
    pub sections: Map<String, Value>,
    /// Reviewer feedback for a regenerated step.
    pub feedback: Option<String>,
}

impl StepContext {
    pub fn from_run(
        run: &WorkflowRun,
        language: Language,
        feedback: Option<String>,
    ) -> Result<Self, StepError> {
        let input: GenerationInput = serde_json::from_value(run.input_data.clone())
            .map_err(|e| StepError::Corrupt(format!("stored input: {e}")))?;

        let mut ctx = Self {
            input,
            language,
            candidates: Vec::new(),
            entries: Vec::new(),
            sections: Map::new(),
            feedback,
        };

        for record in &run.completed_step_outputs {
            let Some(object) = record.output.as_object() else {
                continue;
            };
            for (key, value) in object {
                match key.as_str() {
                    CANDIDATES_KEY => {
                        ctx.candidates = serde_json::from_value(value.clone()).map_err(|e| {
                            StepError::Corrupt(format!("{} candidates: {e}", record.step_id))
                        })?;
                    }
                    ENTRIES_KEY => {
                        ctx.entries = serde_json::from_value(value.clone()).map_err(|e| {
                            StepError::Corrupt(format!("{} entries: {e}", record.step_id))
                        })?;
                    }
                    _ => merge_section(&mut ctx.sections, key, value.clone()),
                }
            }
        }

        Ok(ctx)
    }
}

/// Insert a section, concatenating arrays when the key already exists.
pub fn merge_section(sections: &mut Map<String, Value>, key: &str, value: Value) {
    match (sections.get_mut(key), value) {
        (Some(Value::Array(existing)), Value::Array(more)) => existing.extend(more),
        (_, value) => {
            sections.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexiflow_types::workflow::StepOutputRecord;
    use serde_json::json;

    fn run_with_outputs(outputs: Vec<(&str, Value)>) -> WorkflowRun {
        let mut run = WorkflowRun::new(
            "lesson",
            json!({
                "readingText": "La casa es grande.",
                "targetLevel": "A1",
                "targetLanguage": "es",
                "maxItems": 3
            }),
            "alice",
        );
        run.completed_step_outputs = outputs
            .into_iter()
            .map(|(id, output)| StepOutputRecord {
                step_id: id.to_string(),
                output,
            })
            .collect();
        run
    }

    #[test]
    fn test_context_collects_outputs() {
        let run = run_with_outputs(vec![
            (
                "extract-candidates",
                json!({"candidates": [{"word": "casa", "normalizedForm": "casa", "partOfSpeech": "NOUN", "frequency": 1}]}),
            ),
            ("generate-vocabulary", json!({"vocabulary": [1, 2]})),
            ("generate-practice", json!({"exercises": [3], "grammar": [4]})),
        ]);
        let ctx = StepContext::from_run(&run, Language::Es, None).unwrap();
        assert_eq!(ctx.candidates.len(), 1);
        assert!(ctx.entries.is_empty());
        assert_eq!(ctx.input.max_items, 3);
        let keys: Vec<_> = ctx.sections.keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(ctx.sections["vocabulary"], json!([1, 2]));
    }

    #[test]
    fn test_context_rejects_corrupt_candidates() {
        let run = run_with_outputs(vec![("extract-candidates", json!({"candidates": "oops"}))]);
        assert!(matches!(
            StepContext::from_run(&run, Language::Es, None),
            Err(StepError::Corrupt(_))
        ));
    }

    #[test]
    fn test_merge_section_concatenates_arrays() {
        let mut sections = Map::new();
        merge_section(&mut sections, "exercises", json!([1]));
        merge_section(&mut sections, "exercises", json!([2, 3]));
        assert_eq!(sections["exercises"], json!([1, 2, 3]));
    }
}
