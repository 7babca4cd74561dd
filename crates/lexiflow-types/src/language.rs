//! Supported content languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the analyzer and dictionary router know how to handle.
///
/// Serialized as its ISO 639-1 code (`"es"`, `"la"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
    Fr,
    De,
    It,
    Pt,
    La,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Es,
        Language::En,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Pt,
        Language::La,
    ];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::La => "la",
        }
    }

    /// English display name, used in generation prompts.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::La => "Latin",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts bare codes and region-tagged codes (`es`, `ES`, `es-MX`, `pt_BR`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let primary = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if primary.len() < 2 || primary.len() > 3 || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(format!("malformed language code: '{trimmed}'"));
        }

        match primary.as_str() {
            "es" | "spa" => Ok(Language::Es),
            "en" | "eng" => Ok(Language::En),
            "fr" | "fra" => Ok(Language::Fr),
            "de" | "deu" => Ok(Language::De),
            "it" | "ita" => Ok(Language::It),
            "pt" | "por" => Ok(Language::Pt),
            "la" | "lat" => Ok(Language::La),
            _ => Err(format!("unsupported language: '{trimmed}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_roundtrip() {
        for lang in Language::ALL {
            let parsed: Language = lang.to_string().parse().unwrap();
            assert_eq!(lang, parsed);
        }
    }

    #[test]
    fn test_language_region_subtag() {
        assert_eq!("es-MX".parse::<Language>().unwrap(), Language::Es);
        assert_eq!("PT_br".parse::<Language>().unwrap(), Language::Pt);
        assert_eq!(" LA ".parse::<Language>().unwrap(), Language::La);
    }

    #[test]
    fn test_language_rejects_unknown_and_malformed() {
        let err = "xx".parse::<Language>().unwrap_err();
        assert!(err.contains("unsupported"));
        let err = "".parse::<Language>().unwrap_err();
        assert!(err.contains("malformed"));
        let err = "e$".parse::<Language>().unwrap_err();
        assert!(err.contains("malformed"));
    }

    #[test]
    fn test_language_serde() {
        let json = serde_json::to_string(&Language::De).unwrap();
        assert_eq!(json, "\"de\"");
    }
}
