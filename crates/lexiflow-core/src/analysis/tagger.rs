//! Heuristic part-of-speech tagger.
//!
//! Rules are applied in order, first match wins:
//! 1. closed-class word lists (function words, determiners, copulas)
//! 2. seed lexicon
//! 3. capitalization away from a sentence start (proper nouns; all German nouns)
//! 4. derivational suffixes
//! 5. left context: after a determiner -> NOUN, after a copula -> ADJ
//! 6. otherwise OTHER

use lexiflow_types::analysis::{PartOfSpeech, TokenClass};
use lexiflow_types::language::Language;

use super::lexicon::{LanguageRules, rules_for};
use super::tokenizer::Token;

/// A token with its case-folded form and tagger verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub token: Token,
    pub normalized: String,
    pub class: TokenClass,
    pub lemma: Option<String>,
}

/// Tag every token of one text.
pub fn tag(tokens: Vec<Token>, language: Language) -> Vec<TaggedToken> {
    let rules = rules_for(language);
    let mut tagged: Vec<TaggedToken> = Vec::with_capacity(tokens.len());

    for token in tokens {
        let normalized = token.surface.to_lowercase();
        let previous = if token.sentence_start {
            None
        } else {
            tagged.last().map(|t| t.normalized.as_str())
        };
        let (class, lemma) = classify(rules, &token, &normalized, previous);
        tagged.push(TaggedToken {
            token,
            normalized,
            class,
            lemma,
        });
    }

    tagged
}

fn classify(
    rules: &LanguageRules,
    token: &Token,
    normalized: &str,
    previous: Option<&str>,
) -> (TokenClass, Option<String>) {
    if rules.is_function_word(normalized) {
        return (TokenClass::Function, None);
    }

    if let Some((_, pos, lemma)) = rules.lookup(normalized) {
        return (TokenClass::Content(*pos), lemma.map(str::to_string));
    }

    let capitalized = token.surface.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !token.sentence_start {
        return (TokenClass::Content(PartOfSpeech::Noun), None);
    }

    match rules.suffix_class(normalized) {
        Some(Some(pos)) => {
            // A capitalized German word is a noun whatever its ending.
            if rules.capitalized_nouns && capitalized {
                return (TokenClass::Content(PartOfSpeech::Noun), None);
            }
            return (TokenClass::Content(pos), None);
        }
        Some(None) => return (TokenClass::Function, None),
        None => {}
    }

    if let Some(prev) = previous {
        if rules.determiners.contains(&prev) {
            return (TokenClass::Content(PartOfSpeech::Noun), None);
        }
        if rules.copulas.contains(&prev) {
            return (TokenClass::Content(PartOfSpeech::Adj), None);
        }
    }

    (TokenClass::Content(PartOfSpeech::Other), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::tokenize;

    fn classes(text: &str, language: Language) -> Vec<(String, TokenClass)> {
        tag(tokenize(text, language), language)
            .into_iter()
            .map(|t| (t.normalized, t.class))
            .collect()
    }

    fn class_of(text: &str, language: Language, word: &str) -> TokenClass {
        classes(text, language)
            .into_iter()
            .find(|(w, _)| w == word)
            .map(|(_, c)| c)
            .unwrap()
    }

    #[test]
    fn test_spanish_sentence() {
        let text = "El gato duerme en la casa. La casa es grande.";
        assert_eq!(class_of(text, Language::Es, "el"), TokenClass::Function);
        assert_eq!(class_of(text, Language::Es, "gato"), TokenClass::Content(PartOfSpeech::Noun));
        assert_eq!(class_of(text, Language::Es, "duerme"), TokenClass::Content(PartOfSpeech::Verb));
        assert_eq!(class_of(text, Language::Es, "grande"), TokenClass::Content(PartOfSpeech::Adj));
    }

    #[test]
    fn test_context_rules() {
        // Neither word is in the lexicon; context decides.
        let text = "Vimos la ventana y era amarilla";
        assert_eq!(class_of(text, Language::Es, "ventana"), TokenClass::Content(PartOfSpeech::Noun));
        assert_eq!(class_of(text, Language::Es, "amarilla"), TokenClass::Content(PartOfSpeech::Adj));
    }

    #[test]
    fn test_context_does_not_cross_sentences() {
        let text = "Vi la. Ventana";
        assert_eq!(
            class_of(text, Language::Es, "ventana"),
            TokenClass::Content(PartOfSpeech::Other)
        );
    }

    #[test]
    fn test_suffix_rules_and_adverbs() {
        let text = "Corría rápidamente hacia la estación";
        assert_eq!(class_of(text, Language::Es, "rápidamente"), TokenClass::Function);
        assert_eq!(class_of(text, Language::Es, "estación"), TokenClass::Content(PartOfSpeech::Noun));
    }

    #[test]
    fn test_german_capitalized_nouns() {
        let text = "Heute schläft die Katze im Garten";
        assert_eq!(class_of(text, Language::De, "katze"), TokenClass::Content(PartOfSpeech::Noun));
        assert_eq!(class_of(text, Language::De, "garten"), TokenClass::Content(PartOfSpeech::Noun));
        assert_eq!(class_of(text, Language::De, "schläft"), TokenClass::Content(PartOfSpeech::Verb));
    }

    #[test]
    fn test_english_proper_noun_mid_sentence() {
        let text = "We visited Madrid yesterday";
        assert_eq!(class_of(text, Language::En, "madrid"), TokenClass::Content(PartOfSpeech::Noun));
    }

    #[test]
    fn test_lemma_from_lexicon() {
        let tagged = tag(tokenize("Puella rosam amat", Language::La), Language::La);
        let amat = tagged.iter().find(|t| t.normalized == "amat").unwrap();
        assert_eq!(amat.lemma.as_deref(), Some("amo"));
    }
}
