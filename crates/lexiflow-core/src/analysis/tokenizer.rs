//! Language-aware word tokenization.
//!
//! Splits on anything that is not alphanumeric, keeping apostrophes and
//! hyphens only when they sit between two word characters. French and
//! Italian elided articles (`l'homme`, `dell'acqua`) are stripped from the
//! front of a token; English possessive `'s` is stripped from the back.

use lexiflow_types::language::Language;

/// One word-like span from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form after elision handling, original casing preserved.
    pub surface: String,
    /// Zero-based position among all tokens of the text.
    pub index: usize,
    /// True for the first token of the text or after `.`, `!`, `?`, `…`.
    pub sentence_start: bool,
}

const FRENCH_ELISIONS: &[&str] = &[
    "l", "d", "j", "m", "n", "s", "t", "c", "qu", "jusqu", "lorsqu", "puisqu", "quoiqu",
];

const ITALIAN_ELISIONS: &[&str] = &[
    "l", "un", "dell", "all", "dall", "nell", "sull", "quell", "c", "d", "s",
];

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\u{2026}')
}

/// Split `text` into tokens.
pub fn tokenize(text: &str, language: Language) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut sentence_start = true;
    let mut pending_start = true;

    let flush = |current: &mut String, starts: bool, tokens: &mut Vec<Token>| {
        if current.is_empty() {
            return;
        }
        let word = std::mem::take(current);
        if let Some(surface) = apply_language_rules(&word, language) {
            let index = tokens.len();
            tokens.push(Token {
                surface,
                index,
                sentence_start: starts,
            });
        }
    };

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            if current.is_empty() {
                sentence_start = pending_start;
                pending_start = false;
            }
            current.push(c);
        } else if is_joiner(c)
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        {
            // Normalize typographic apostrophes.
            current.push(if c == '\u{2019}' { '\'' } else { c });
        } else {
            flush(&mut current, sentence_start, &mut tokens);
            if is_sentence_end(c) {
                pending_start = true;
            }
        }
    }
    flush(&mut current, sentence_start, &mut tokens);

    tokens
}

/// Per-language cleanup of a raw span. Returns `None` if nothing is left.
fn apply_language_rules(word: &str, language: Language) -> Option<String> {
    let cleaned = match language {
        Language::Fr => strip_elision(word, FRENCH_ELISIONS),
        Language::It => strip_elision(word, ITALIAN_ELISIONS),
        Language::En => word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("'S"))
            .unwrap_or(word),
        _ => word,
    };
    let cleaned = cleaned.trim_matches(is_joiner);
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn strip_elision<'a>(word: &'a str, prefixes: &[&str]) -> &'a str {
    if let Some((head, tail)) = word.split_once('\'') {
        if prefixes.contains(&head.to_lowercase().as_str()) {
            return tail;
        }
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn test_basic_split_and_sentence_starts() {
        let tokens = tokenize("El gato duerme. La casa es grande!", Language::Es);
        assert_eq!(
            surfaces(&tokens),
            vec!["El", "gato", "duerme", "La", "casa", "es", "grande"]
        );
        assert!(tokens[0].sentence_start);
        assert!(!tokens[1].sentence_start);
        assert!(tokens[3].sentence_start);
        assert_eq!(tokens[4].index, 4);
    }

    #[test]
    fn test_spanish_inverted_punctuation() {
        let tokens = tokenize("¿Dónde está? ¡Aquí!", Language::Es);
        assert_eq!(surfaces(&tokens), vec!["Dónde", "está", "Aquí"]);
        assert!(tokens[2].sentence_start);
    }

    #[test]
    fn test_french_elision() {
        let tokens = tokenize("L'homme qu'il aime. C\u{2019}est l'été.", Language::Fr);
        assert_eq!(surfaces(&tokens), vec!["homme", "il", "aime", "est", "été"]);
    }

    #[test]
    fn test_italian_elision() {
        let tokens = tokenize("Un bicchiere dell'acqua", Language::It);
        assert_eq!(surfaces(&tokens), vec!["Un", "bicchiere", "acqua"]);
    }

    #[test]
    fn test_english_possessive_and_hyphen() {
        let tokens = tokenize("The cat's well-known toy -- 42 items", Language::En);
        assert_eq!(
            surfaces(&tokens),
            vec!["The", "cat", "well-known", "toy", "42", "items"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("", Language::De).is_empty());
        assert!(tokenize(" ... !!! ", Language::De).is_empty());
    }
}
