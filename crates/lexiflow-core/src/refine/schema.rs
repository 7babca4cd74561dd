//! Output schemas and post-hoc validation of generation responses.
//!
//! The schema sent with the request is derived from the item structs; the
//! response is then parsed into those same structs and checked for the
//! constraints a JSON schema cannot express well (non-empty strings,
//! difficulty range, answer among options).

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use lexiflow_types::content::{
    DialogTurn, ExerciseItem, ExerciseType, GeneratedBatch, GeneratedItem, GrammarConcept, ItemKind,
    VocabularyItem,
};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Recursively set `additionalProperties: false` on every object schema.
pub fn add_additional_properties_false(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let is_object_schema = map.contains_key("properties")
                || map.get("type").and_then(Value::as_str) == Some("object");
            if is_object_schema {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for (_, child) in map.iter_mut() {
                add_additional_properties_false(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                add_additional_properties_false(child);
            }
        }
        _ => {}
    }
}

fn batch_schema<T: JsonSchema>() -> Value {
    let mut schema = schemars::schema_for!(GeneratedBatch<T>).to_value();
    add_additional_properties_false(&mut schema);
    schema
}

/// JSON schema of the `{ "items": [...] }` envelope for one item kind.
pub fn output_schema(kind: ItemKind) -> Value {
    match kind {
        ItemKind::Vocabulary => batch_schema::<VocabularyItem>(),
        ItemKind::Exercise => batch_schema::<ExerciseItem>(),
        ItemKind::Grammar => batch_schema::<GrammarConcept>(),
        ItemKind::Dialog => batch_schema::<DialogTurn>(),
    }
}

/// Schema name sent alongside the schema.
pub fn schema_name(kind: ItemKind) -> String {
    format!("{kind}_batch")
}

/// Parse and validate a raw response. The error string describes the first
/// problem found, phrased so it can be fed back to the model.
pub fn validate_response(kind: ItemKind, raw: &str) -> Result<Vec<GeneratedItem>, String> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| format!("the response was not valid JSON ({e})"))?;

    let items = match kind {
        ItemKind::Vocabulary => parse_items::<VocabularyItem>(value, GeneratedItem::Vocabulary)?,
        ItemKind::Exercise => parse_items::<ExerciseItem>(value, GeneratedItem::Exercise)?,
        ItemKind::Grammar => parse_items::<GrammarConcept>(value, GeneratedItem::Grammar)?,
        ItemKind::Dialog => parse_items::<DialogTurn>(value, GeneratedItem::Dialog)?,
    };

    if items.is_empty() {
        return Err("the items array was empty".to_string());
    }
    for (i, item) in items.iter().enumerate() {
        check_item(item).map_err(|reason| format!("items[{i}] {reason}"))?;
    }
    Ok(items)
}

fn parse_items<T: DeserializeOwned>(
    value: Value,
    wrap: fn(T) -> GeneratedItem,
) -> Result<Vec<GeneratedItem>, String> {
    let batch: GeneratedBatch<T> = serde_json::from_value(value)
        .map_err(|e| format!("the response did not match the schema ({e})"))?;
    Ok(batch.items.into_iter().map(wrap).collect())
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("has an empty {field}"))
    } else {
        Ok(())
    }
}

fn check_difficulty(difficulty: u8) -> Result<(), String> {
    if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        Ok(())
    } else {
        Err(format!(
            "has difficulty {difficulty}, expected {MIN_DIFFICULTY} to {MAX_DIFFICULTY}"
        ))
    }
}

fn check_item(item: &GeneratedItem) -> Result<(), String> {
    match item {
        GeneratedItem::Vocabulary(v) => {
            require("word", &v.word)?;
            require("definition", &v.definition)?;
            require("exampleSentence", &v.example_sentence)?;
            check_difficulty(v.difficulty)
        }
        GeneratedItem::Exercise(e) => {
            require("prompt", &e.prompt)?;
            require("answer", &e.answer)?;
            if e.exercise_type == ExerciseType::MultipleChoice {
                if e.options.len() < 2 {
                    return Err("is multiple_choice but has fewer than 2 options".to_string());
                }
                if !e.options.iter().any(|o| o == &e.answer) {
                    return Err("has an answer that is not one of its options".to_string());
                }
            }
            check_difficulty(e.difficulty)
        }
        GeneratedItem::Grammar(g) => {
            require("title", &g.title)?;
            require("explanation", &g.explanation)?;
            if g.examples.is_empty() {
                return Err("has no examples".to_string());
            }
            check_difficulty(g.difficulty)
        }
        GeneratedItem::Dialog(d) => {
            require("speaker", &d.speaker)?;
            require("text", &d.text)?;
            check_difficulty(d.difficulty)
        }
    }
}

/// Tolerate responses wrapped in a markdown code fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
