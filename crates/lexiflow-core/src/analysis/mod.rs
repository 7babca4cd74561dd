//! Local text analysis: tokenization, heuristic tagging, candidate ranking.

pub mod analyzer;
pub mod lexicon;
pub mod tagger;
pub mod tokenizer;

pub use analyzer::TextAnalyzer;

/// Errors from text analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("unsupported or malformed language code: '{0}'")]
    UnsupportedLanguage(String),
}
