//! Text analysis output types: candidates and per-token analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse part of speech assigned by the heuristic tagger.
///
/// Only content-bearing classes are kept as candidates; tokens the tagger
/// cannot classify are `Other` and rank last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adj,
    Other,
}

impl PartOfSpeech {
    /// Ranking weight for tie-breaking; lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            PartOfSpeech::Noun => 0,
            PartOfSpeech::Verb => 1,
            PartOfSpeech::Adj => 2,
            PartOfSpeech::Other => 3,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartOfSpeech::Noun => write!(f, "NOUN"),
            PartOfSpeech::Verb => write!(f, "VERB"),
            PartOfSpeech::Adj => write!(f, "ADJ"),
            PartOfSpeech::Other => write!(f, "OTHER"),
        }
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOUN" => Ok(PartOfSpeech::Noun),
            "VERB" => Ok(PartOfSpeech::Verb),
            "ADJ" => Ok(PartOfSpeech::Adj),
            "OTHER" => Ok(PartOfSpeech::Other),
            other => Err(format!("invalid part of speech: '{other}'")),
        }
    }
}

/// A provisional vocabulary token extracted from source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Surface form as it first appeared in the text.
    pub word: String,
    /// Case-folded form; unique within one extraction.
    pub normalized_form: String,
    pub part_of_speech: PartOfSpeech,
    /// Raw occurrence count in the source text (always >= 1).
    pub frequency: u32,
}

/// Tagger verdict for a single token, including closed-class words that
/// never become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    /// Open-class word with a known or guessed part of speech.
    Content(PartOfSpeech),
    /// Determiner, preposition, pronoun, conjunction, auxiliary.
    Function,
}

/// Word-level analysis of one token, as returned by the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnalysis {
    /// Surface form.
    pub form: String,
    /// Case-folded form.
    pub normalized: String,
    /// Dictionary form if the lexicon knows this inflection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    /// `None` for closed-class words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<PartOfSpeech>,
    /// Zero-based token position in the text.
    pub index: usize,
}
