//! Canonical dictionary entry shape, independent of the provider that produced it.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Definitions grouped under one part of speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionGroup {
    /// Provider-reported part of speech label, lowercased (e.g. "noun").
    pub part_of_speech: String,
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pronunciation {
    /// IPA or provider phonetic text.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
}

/// Result of a dictionary lookup.
///
/// `found == false` is a normal terminal result. `degraded == true` means no
/// provider could be reached, as opposed to a provider answering "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    pub language: Language,
    pub found: bool,
    #[serde(default)]
    pub definitions: Vec<DefinitionGroup>,
    #[serde(default)]
    pub pronunciations: Vec<Pronunciation>,
    /// Id of the provider that produced (or failed to produce) this entry.
    pub source: String,
    #[serde(default)]
    pub degraded: bool,
}

impl DictionaryEntry {
    /// A provider answered but had nothing for this word.
    pub fn not_found(word: &str, language: Language, source: &str) -> Self {
        Self {
            word: word.to_string(),
            language,
            found: false,
            definitions: Vec::new(),
            pronunciations: Vec::new(),
            source: source.to_string(),
            degraded: false,
        }
    }

    /// No provider could be reached.
    pub fn unavailable(word: &str, language: Language, source: &str) -> Self {
        Self {
            degraded: true,
            ..Self::not_found(word, language, source)
        }
    }

    /// First meaning of the first definition group, for compact prompt glosses.
    pub fn primary_gloss(&self) -> Option<&str> {
        self.definitions
            .iter()
            .flat_map(|g| g.meanings.iter())
            .next()
            .map(String::as_str)
    }
}
