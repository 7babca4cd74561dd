//! Instruction payloads for the generation call.

use std::fmt::Write;

use lexiflow_types::analysis::Candidate;
use lexiflow_types::content::{CefrLevel, ItemKind};
use lexiflow_types::dictionary::DictionaryEntry;
use lexiflow_types::language::Language;

/// Longest gloss quoted per candidate, in characters.
const MAX_GLOSS_CHARS: usize = 80;

/// Everything the refiner needs for one generation call.
#[derive(Debug, Clone)]
pub struct RefineRequest<'a> {
    pub kind: ItemKind,
    pub candidates: &'a [Candidate],
    /// Dictionary entries for (some of) the candidates; may be empty.
    pub entries: &'a [DictionaryEntry],
    pub source_text: &'a str,
    pub target_level: CefrLevel,
    pub target_language: Language,
    pub max_items: u32,
    /// Provenance copied onto every emitted item.
    pub source_reading_ids: &'a [String],
    /// Extra instruction, e.g. a specific exercise type.
    pub focus: Option<&'a str>,
    /// Reviewer feedback on a rejected previous version.
    pub feedback: Option<&'a str>,
}

pub fn system_prompt() -> &'static str {
    "You write language-learning material. Respond with a single JSON object \
     that matches the provided schema exactly. Do not add commentary, markdown \
     or fields that are not in the schema."
}

fn task_line(kind: ItemKind, max_items: u32, level: CefrLevel, language: Language) -> String {
    let lang = language.english_name();
    match kind {
        ItemKind::Vocabulary => format!(
            "Select up to {max_items} vocabulary items from the candidate words that are most \
             useful for {level} learners of {lang}. Rank them most useful first."
        ),
        ItemKind::Exercise => format!(
            "Write up to {max_items} practice exercises for {level} learners of {lang} that \
             reuse sentences and words from the source text."
        ),
        ItemKind::Grammar => format!(
            "Identify up to {max_items} grammar points illustrated by the source text that \
             suit {level} learners of {lang}."
        ),
        ItemKind::Dialog => format!(
            "Write a short dialog of up to {max_items} turns in {lang} for {level} learners, \
             using vocabulary from the source text."
        ),
    }
}

/// Build the user instruction. `corrections` are validation failures of
/// earlier attempts, oldest first.
pub fn build_instruction(request: &RefineRequest<'_>, corrections: &[String]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        task_line(
            request.kind,
            request.max_items,
            request.target_level,
            request.target_language
        )
    );
    if let Some(focus) = request.focus {
        let _ = writeln!(out, "Focus: {focus}");
    }
    let _ = writeln!(
        out,
        "Set cefrLevel to the level each item is appropriate for and difficulty from 1 (easiest) to 5."
    );

    let _ = writeln!(out, "\nSource text:\n\"\"\"\n{}\n\"\"\"", request.source_text.trim());

    if !request.candidates.is_empty() {
        let _ = writeln!(out, "\nCandidate words (word | part of speech | frequency | gloss):");
        for c in request.candidates {
            let gloss = request
                .entries
                .iter()
                .find(|e| e.found && e.word == c.normalized_form)
                .and_then(|e| e.primary_gloss())
                .map(|g| truncate_chars(g, MAX_GLOSS_CHARS))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "- {} | {} | {} | {}",
                c.normalized_form, c.part_of_speech, c.frequency, gloss
            );
        }
    }

    if let Some(feedback) = request.feedback.filter(|f| !f.trim().is_empty()) {
        let _ = writeln!(
            out,
            "\nA reviewer rejected the previous version with this feedback:\n{}",
            feedback.trim()
        );
    }

    for reason in corrections {
        let _ = writeln!(
            out,
            "\nThe previous response was invalid because {reason}; correct and resend."
        );
    }

    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max).collect();
        t.push('…');
        t
    }
}
