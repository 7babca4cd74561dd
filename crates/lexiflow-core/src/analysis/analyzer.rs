//! Candidate extraction: tokenize, tag, count, rank.

use std::collections::HashMap;

use lexiflow_types::analysis::{Candidate, PartOfSpeech, TokenClass, WordAnalysis};
use lexiflow_types::language::Language;

use super::AnalysisError;
use super::tagger::{TaggedToken, tag};
use super::tokenizer::tokenize;

/// Shortest token (in characters) that can become a candidate.
pub const MIN_CANDIDATE_CHARS: usize = 3;

/// Local, deterministic candidate extraction. Holds no state; every call is
/// a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAnalyzer;

struct Tally {
    word: String,
    first_seen: usize,
    frequency: u32,
    part_of_speech: PartOfSpeech,
}

impl TextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Extract up to `max_candidates` content words from `text`.
    ///
    /// Ranking: frequency descending, then NOUN > VERB > ADJ > OTHER, then
    /// first occurrence. Function words, tokens shorter than three
    /// characters and purely numeric tokens are dropped.
    pub fn extract_candidates(
        &self,
        text: &str,
        language: &str,
        max_candidates: usize,
    ) -> Result<Vec<Candidate>, AnalysisError> {
        let language = parse_language(language)?;
        let tagged = tag(tokenize(text, language), language);

        let mut order: Vec<String> = Vec::new();
        let mut tallies: HashMap<String, Tally> = HashMap::new();

        for t in &tagged {
            let TokenClass::Content(pos) = t.class else {
                continue;
            };
            if !is_candidate_shape(&t.normalized) {
                continue;
            }
            match tallies.get_mut(&t.normalized) {
                Some(tally) => {
                    tally.frequency += 1;
                    // Later occurrences may resolve a word the first one could not.
                    if tally.part_of_speech == PartOfSpeech::Other {
                        tally.part_of_speech = pos;
                    }
                }
                None => {
                    order.push(t.normalized.clone());
                    tallies.insert(
                        t.normalized.clone(),
                        Tally {
                            word: t.token.surface.clone(),
                            first_seen: t.token.index,
                            frequency: 1,
                            part_of_speech: pos,
                        },
                    );
                }
            }
        }

        let mut ranked: Vec<(String, Tally)> = order
            .into_iter()
            .filter_map(|key| tallies.remove(&key).map(|t| (key, t)))
            .collect();

        ranked.sort_by(|(_, a), (_, b)| {
            b.frequency
                .cmp(&a.frequency)
                .then(a.part_of_speech.priority().cmp(&b.part_of_speech.priority()))
                .then(a.first_seen.cmp(&b.first_seen))
        });

        let candidates: Vec<Candidate> = ranked
            .into_iter()
            .take(max_candidates)
            .map(|(normalized_form, t)| Candidate {
                word: t.word,
                normalized_form,
                part_of_speech: t.part_of_speech,
                frequency: t.frequency,
            })
            .collect();

        tracing::debug!(
            language = %language,
            tokens = tagged.len(),
            candidates = candidates.len(),
            "extracted candidates"
        );

        Ok(candidates)
    }

    /// Per-token breakdown of the whole text, function words included.
    pub fn analyze(&self, text: &str, language: &str) -> Result<Vec<WordAnalysis>, AnalysisError> {
        let language = parse_language(language)?;
        Ok(tag(tokenize(text, language), language)
            .into_iter()
            .map(word_analysis)
            .collect())
    }
}

fn word_analysis(t: TaggedToken) -> WordAnalysis {
    let part_of_speech = match t.class {
        TokenClass::Content(pos) => Some(pos),
        TokenClass::Function => None,
    };
    WordAnalysis {
        form: t.token.surface,
        normalized: t.normalized,
        lemma: t.lemma,
        part_of_speech,
        index: t.token.index,
    }
}

fn parse_language(code: &str) -> Result<Language, AnalysisError> {
    code.parse::<Language>()
        .map_err(|_| AnalysisError::UnsupportedLanguage(code.to_string()))
}

fn is_candidate_shape(normalized: &str) -> bool {
    normalized.chars().count() >= MIN_CANDIDATE_CHARS
        && !normalized.chars().all(|c| c.is_numeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.normalized_form.as_str()).collect()
    }

    #[test]
    fn test_spanish_ranking() {
        let analyzer = TextAnalyzer::new();
        let text = "El gato duerme en la casa. La casa es grande.";

        let all = analyzer.extract_candidates(text, "es", 10).unwrap();
        assert_eq!(words(&all), vec!["casa", "gato", "duerme", "grande"]);
        assert_eq!(all[0].frequency, 2);
        assert_eq!(all[0].part_of_speech, PartOfSpeech::Noun);
        assert!(all[1..].iter().all(|c| c.frequency == 1));

        let top = analyzer.extract_candidates(text, "es", 3).unwrap();
        assert_eq!(words(&top), vec!["casa", "gato", "duerme"]);
    }

    #[test]
    fn test_case_folding_keeps_first_surface() {
        let analyzer = TextAnalyzer::new();
        let text = "Madrid es grande. Vivo en Madrid y madrid me gusta.";
        let candidates = analyzer.extract_candidates(text, "es", 10).unwrap();
        let madrid = candidates.iter().find(|c| c.normalized_form == "madrid").unwrap();
        assert_eq!(madrid.frequency, 3);
        assert_eq!(madrid.word, "Madrid");
    }

    #[test]
    fn test_unique_and_sorted() {
        let analyzer = TextAnalyzer::new();
        let text = "The dog saw the cat. The cat saw the dog. A cat is a cat. \
                    Happiness is useful and the nation was large.";
        let candidates = analyzer.extract_candidates(text, "en", 50).unwrap();

        let mut seen = std::collections::HashSet::new();
        for c in &candidates {
            assert!(seen.insert(c.normalized_form.clone()), "duplicate {}", c.normalized_form);
        }
        for pair in candidates.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.frequency > b.frequency
                    || (a.frequency == b.frequency
                        && a.part_of_speech.priority() <= b.part_of_speech.priority()),
                "{a:?} ranked before {b:?}"
            );
        }
        assert_eq!(candidates[0].normalized_form, "cat");
        assert_eq!(candidates[0].frequency, 4);
    }

    #[test]
    fn test_drops_short_and_numeric_tokens() {
        let analyzer = TextAnalyzer::new();
        let candidates = analyzer
            .extract_candidates("Tengo 1234 gatos y un pez en 2024", "es", 10)
            .unwrap();
        let forms = words(&candidates);
        assert!(!forms.contains(&"1234"));
        assert!(!forms.contains(&"2024"));
        assert!(!forms.contains(&"un"));
        assert!(forms.contains(&"pez"));
        assert!(forms.iter().all(|w| w.chars().count() >= 3));
    }

    #[test]
    fn test_unknown_pos_ranked_last() {
        let analyzer = TextAnalyzer::new();
        // "zorblat" is unknown everywhere; "gato" is a known noun.
        let candidates = analyzer
            .extract_candidates("Zorblat gato", "es", 10)
            .unwrap();
        assert_eq!(words(&candidates), vec!["gato", "zorblat"]);
        assert_eq!(candidates[1].part_of_speech, PartOfSpeech::Other);
    }

    #[test]
    fn test_unsupported_language() {
        let analyzer = TextAnalyzer::new();
        let err = analyzer.extract_candidates("hola", "xx", 5).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedLanguage(ref code) if code == "xx"));
        assert!(analyzer.extract_candidates("hola", "", 5).is_err());
    }

    #[test]
    fn test_deterministic() {
        let analyzer = TextAnalyzer::new();
        let text = "La luna y el sol. El sol brilla sobre la luna llena.";
        let a = analyzer.extract_candidates(text, "es", 10).unwrap();
        let b = analyzer.extract_candidates(text, "es", 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_analyze_reports_every_token() {
        let analyzer = TextAnalyzer::new();
        let words = analyzer.analyze("El gato duerme.", "es").unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].part_of_speech, None);
        assert_eq!(words[2].lemma.as_deref(), Some("dormir"));
        assert_eq!(words[2].index, 2);
    }

    #[test]
    fn test_empty_text() {
        let analyzer = TextAnalyzer::new();
        assert!(analyzer.extract_candidates("", "en", 5).unwrap().is_empty());
    }
}
