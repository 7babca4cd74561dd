//! Wiktionary REST provider (every supported language).
//!
//! `GET {base}/api/rest_v1/page/definition/{word}` returns usages keyed by
//! language code, with HTML-formatted definitions. Only the usages for the
//! requested language are kept.

use std::collections::HashMap;

use serde::Deserialize;

use lexiflow_core::dictionary::DictionaryProvider;
use lexiflow_types::dictionary::{DefinitionGroup, DictionaryEntry};
use lexiflow_types::error::DictionaryError;
use lexiflow_types::language::Language;

use super::{status_error, transport_error};

pub const PROVIDER_ID: &str = "wiktionary";

const DEFAULT_BASE_URL: &str = "https://en.wiktionary.org";

// ---------------------------------------------------------------------------
// Raw response shape
// ---------------------------------------------------------------------------

/// Usages of one word in one language.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiktionaryUsage {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<WiktionaryDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WiktionaryDefinition {
    /// HTML fragment.
    pub definition: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct WiktionaryProvider {
    http: reqwest::Client,
    base_url: String,
}

impl WiktionaryProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn definition_url(&self, word: &str) -> Result<reqwest::Url, DictionaryError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| DictionaryError::Transport(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DictionaryError::Transport("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "definition", word]);
        Ok(url)
    }
}

impl DictionaryProvider for WiktionaryProvider {
    type Raw = Vec<WiktionaryUsage>;

    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch(
        &self,
        word: &str,
        language: Language,
    ) -> Result<Option<Self::Raw>, DictionaryError> {
        let url = self.definition_url(word)?;
        let response = self.http.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status));
        }

        let mut by_language: HashMap<String, Vec<WiktionaryUsage>> =
            response.json().await.map_err(transport_error)?;
        Ok(by_language
            .remove(language.code())
            .filter(|usages| !usages.is_empty()))
    }

    fn adapt(&self, word: &str, language: Language, raw: Self::Raw) -> DictionaryEntry {
        let definitions: Vec<DefinitionGroup> = raw
            .into_iter()
            .filter_map(|usage| {
                let meanings: Vec<String> = usage
                    .definitions
                    .iter()
                    .map(|d| strip_html(&d.definition))
                    .filter(|d| !d.is_empty())
                    .collect();
                (!meanings.is_empty()).then(|| DefinitionGroup {
                    part_of_speech: usage.part_of_speech.to_lowercase(),
                    meanings,
                })
            })
            .collect();

        if definitions.is_empty() {
            return DictionaryEntry::not_found(word, language, PROVIDER_ID);
        }

        DictionaryEntry {
            word: word.to_string(),
            language,
            found: true,
            definitions,
            // The definition endpoint carries no pronunciation data.
            pronunciations: Vec::new(),
            source: PROVIDER_ID.to_string(),
            degraded: false,
        }
    }
}

/// Drop tags, decode the handful of entities Wiktionary emits, and
/// collapse whitespace.
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "es": [
        {
          "partOfSpeech": "Noun",
          "language": "Spanish",
          "definitions": [
            {"definition": "<a rel=\"mw:WikiLink\" href=\"/wiki/house\">house</a>, home"},
            {"definition": "<span></span>"}
          ]
        },
        {
          "partOfSpeech": "Verb",
          "language": "Spanish",
          "definitions": [{"definition": "inflection of <i>casar</i>"}]
        }
      ],
      "pt": [
        {"partOfSpeech": "Noun", "language": "Portuguese", "definitions": [{"definition": "house"}]}
      ]
    }"#;

    fn provider() -> WiktionaryProvider {
        WiktionaryProvider::new(reqwest::Client::new())
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<b>big</b>&nbsp;&amp;  <i>tall</i>\n"),
            "big & tall"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn test_adapt_keeps_requested_language() {
        let mut by_language: HashMap<String, Vec<WiktionaryUsage>> =
            serde_json::from_str(SAMPLE).unwrap();
        let raw = by_language.remove("es").unwrap();
        let entry = provider().adapt("casa", Language::Es, raw);

        assert!(entry.found);
        assert_eq!(entry.language, Language::Es);
        assert_eq!(entry.definitions.len(), 2);
        assert_eq!(entry.definitions[0].part_of_speech, "noun");
        assert_eq!(entry.definitions[0].meanings, vec!["house, home"]);
        assert_eq!(entry.primary_gloss(), Some("house, home"));
    }

    #[test]
    fn test_adapt_empty_usages_is_not_found() {
        let raw = vec![WiktionaryUsage {
            part_of_speech: "Noun".to_string(),
            definitions: vec![WiktionaryDefinition {
                definition: "<span></span>".to_string(),
            }],
        }];
        let entry = provider().adapt("nada", Language::Es, raw);
        assert!(!entry.found);
        assert_eq!(entry.source, PROVIDER_ID);
    }

    #[test]
    fn test_definition_url() {
        let url = provider().definition_url("niño").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wiktionary.org/api/rest_v1/page/definition/ni%C3%B1o"
        );
    }
}
