//! Generated content items produced by the refinement stage.
//!
//! The item structs double as the structured-output contract sent to the
//! generation provider: their JSON schema is derived with `schemars`, and
//! the same structs are used to validate what comes back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// CEFR level
// ---------------------------------------------------------------------------

/// Common European Framework of Reference proficiency tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        };
        f.write_str(s)
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A1" => Ok(CefrLevel::A1),
            "A2" => Ok(CefrLevel::A2),
            "B1" => Ok(CefrLevel::B1),
            "B2" => Ok(CefrLevel::B2),
            "C1" => Ok(CefrLevel::C1),
            "C2" => Ok(CefrLevel::C2),
            other => Err(format!("invalid CEFR level: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Item kinds
// ---------------------------------------------------------------------------

/// Which kind of item a generation step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Vocabulary,
    Exercise,
    Grammar,
    Dialog,
}

impl ItemKind {
    /// Key under which a step's items are stored in its output object.
    pub fn section(&self) -> &'static str {
        match self {
            ItemKind::Vocabulary => "vocabulary",
            ItemKind::Exercise => "exercises",
            ItemKind::Grammar => "grammar",
            ItemKind::Dialog => "dialog",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Vocabulary => write!(f, "vocabulary"),
            ItemKind::Exercise => write!(f, "exercise"),
            ItemKind::Grammar => write!(f, "grammar"),
            ItemKind::Dialog => write!(f, "dialog"),
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A vocabulary card derived from a candidate word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VocabularyItem {
    /// The word as it should be taught (usually the lemma).
    pub word: String,
    /// Coarse part of speech label (noun, verb, adjective, ...).
    pub part_of_speech: String,
    /// Learner-facing definition, in the learner's instruction language.
    pub definition: String,
    /// Example sentence in the target language.
    pub example_sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub cefr_level: CefrLevel,
    /// 1 (easiest) to 5 (hardest).
    pub difficulty: u8,
    /// Provenance, filled in by the caller after generation.
    #[serde(default)]
    #[schemars(skip)]
    pub source_reading_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    FillInBlank,
    MultipleChoice,
    Translation,
    Matching,
}

/// A practice exercise grounded in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExerciseItem {
    pub exercise_type: ExerciseType,
    pub prompt: String,
    /// Answer options; empty for open-ended exercise types.
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub cefr_level: CefrLevel,
    pub difficulty: u8,
    #[serde(default)]
    #[schemars(skip)]
    pub source_reading_ids: Vec<String>,
}

/// A grammar point illustrated by the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GrammarConcept {
    pub title: String,
    pub explanation: String,
    /// Example sentences, preferably quoted from the source text.
    pub examples: Vec<String>,
    pub cefr_level: CefrLevel,
    pub difficulty: u8,
    #[serde(default)]
    #[schemars(skip)]
    pub source_reading_ids: Vec<String>,
}

/// One line of a short practice dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DialogTurn {
    pub speaker: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub cefr_level: CefrLevel,
    pub difficulty: u8,
    #[serde(default)]
    #[schemars(skip)]
    pub source_reading_ids: Vec<String>,
}

/// Any item the refiner can emit, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedItem {
    Vocabulary(VocabularyItem),
    Exercise(ExerciseItem),
    Grammar(GrammarConcept),
    Dialog(DialogTurn),
}

impl GeneratedItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            GeneratedItem::Vocabulary(_) => ItemKind::Vocabulary,
            GeneratedItem::Exercise(_) => ItemKind::Exercise,
            GeneratedItem::Grammar(_) => ItemKind::Grammar,
            GeneratedItem::Dialog(_) => ItemKind::Dialog,
        }
    }

    pub fn cefr_level(&self) -> CefrLevel {
        match self {
            GeneratedItem::Vocabulary(i) => i.cefr_level,
            GeneratedItem::Exercise(i) => i.cefr_level,
            GeneratedItem::Grammar(i) => i.cefr_level,
            GeneratedItem::Dialog(i) => i.cefr_level,
        }
    }

    pub fn source_reading_ids(&self) -> &[String] {
        match self {
            GeneratedItem::Vocabulary(i) => &i.source_reading_ids,
            GeneratedItem::Exercise(i) => &i.source_reading_ids,
            GeneratedItem::Grammar(i) => &i.source_reading_ids,
            GeneratedItem::Dialog(i) => &i.source_reading_ids,
        }
    }

    /// Overwrite provenance with caller-supplied ids.
    pub fn set_source_reading_ids(&mut self, ids: &[String]) {
        let slot = match self {
            GeneratedItem::Vocabulary(i) => &mut i.source_reading_ids,
            GeneratedItem::Exercise(i) => &mut i.source_reading_ids,
            GeneratedItem::Grammar(i) => &mut i.source_reading_ids,
            GeneratedItem::Dialog(i) => &mut i.source_reading_ids,
        };
        *slot = ids.to_vec();
    }
}

/// Root object of a structured-output response: `{ "items": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GeneratedBatch<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> VocabularyItem {
        VocabularyItem {
            word: "casa".to_string(),
            part_of_speech: "noun".to_string(),
            definition: "house".to_string(),
            example_sentence: "La casa es grande.".to_string(),
            translation: None,
            cefr_level: CefrLevel::A1,
            difficulty: 1,
            source_reading_ids: vec![],
        }
    }

    #[test]
    fn test_cefr_roundtrip_and_order() {
        for level in [
            CefrLevel::A1,
            CefrLevel::A2,
            CefrLevel::B1,
            CefrLevel::B2,
            CefrLevel::C1,
            CefrLevel::C2,
        ] {
            let parsed: CefrLevel = level.to_string().parse().unwrap();
            assert_eq!(level, parsed);
        }
        assert!(CefrLevel::A2 < CefrLevel::B1);
        assert!("b3".parse::<CefrLevel>().is_err());
    }

    #[test]
    fn test_generated_item_serde_tagged() {
        let item = GeneratedItem::Vocabulary(vocab());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "vocabulary");
        assert_eq!(json["cefrLevel"], "A1");
        assert_eq!(json["exampleSentence"], "La casa es grande.");

        let back: GeneratedItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_item_rejects_unknown_fields() {
        let json = serde_json::json!({
            "word": "casa",
            "partOfSpeech": "noun",
            "definition": "house",
            "exampleSentence": "Mi casa.",
            "cefrLevel": "A1",
            "difficulty": 1,
            "mood": "indicative"
        });
        assert!(serde_json::from_value::<VocabularyItem>(json).is_err());
    }

    #[test]
    fn test_set_source_reading_ids() {
        let mut item = GeneratedItem::Vocabulary(vocab());
        item.set_source_reading_ids(&["r1".to_string(), "r2".to_string()]);
        assert_eq!(item.source_reading_ids(), ["r1", "r2"]);
        assert_eq!(item.kind(), ItemKind::Vocabulary);
    }

    #[test]
    fn test_batch_schema_omits_provenance() {
        let schema = schemars::schema_for!(GeneratedBatch<VocabularyItem>);
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.contains("cefrLevel"));
        assert!(!text.contains("sourceReadingIds"));
    }
}
