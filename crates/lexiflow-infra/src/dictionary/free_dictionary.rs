//! Free Dictionary API provider (English).
//!
//! `GET {base}/api/v2/entries/en/{word}` returns an array of entries; a 404
//! means the word is unknown.

use serde::Deserialize;

use lexiflow_core::dictionary::DictionaryProvider;
use lexiflow_types::dictionary::{DefinitionGroup, DictionaryEntry, Pronunciation};
use lexiflow_types::error::DictionaryError;
use lexiflow_types::language::Language;

use super::{status_error, transport_error};

pub const PROVIDER_ID: &str = "freedictionary";

const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev";

// ---------------------------------------------------------------------------
// Raw response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FreeDictionaryRaw {
    #[serde(default)]
    pub phonetics: Vec<RawPhonetic>,
    #[serde(default)]
    pub meanings: Vec<RawMeaning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPhonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<RawDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDefinition {
    pub definition: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct FreeDictionaryProvider {
    http: reqwest::Client,
    base_url: String,
}

impl FreeDictionaryProvider {
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

    fn entry_url(&self, word: &str) -> Result<reqwest::Url, DictionaryError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| DictionaryError::Transport(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DictionaryError::Transport("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "v2", "entries", "en", word]);
        Ok(url)
    }
}

impl DictionaryProvider for FreeDictionaryProvider {
    type Raw = Vec<FreeDictionaryRaw>;

    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch(
        &self,
        word: &str,
        _language: Language,
    ) -> Result<Option<Self::Raw>, DictionaryError> {
        let url = self.entry_url(word)?;
        let response = self.http.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status));
        }

        let raw: Vec<FreeDictionaryRaw> = response.json().await.map_err(transport_error)?;
        Ok(if raw.is_empty() { None } else { Some(raw) })
    }

    fn adapt(&self, word: &str, language: Language, raw: Self::Raw) -> DictionaryEntry {
        let mut definitions: Vec<DefinitionGroup> = Vec::new();
        let mut pronunciations: Vec<Pronunciation> = Vec::new();

        for entry in raw {
            for meaning in entry.meanings {
                let pos = meaning.part_of_speech.to_lowercase();
                let meanings: Vec<String> = meaning
                    .definitions
                    .into_iter()
                    .map(|d| d.definition.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect();
                if meanings.is_empty() {
                    continue;
                }
                // Entries repeat parts of speech across etymologies; fold them.
                match definitions.iter_mut().find(|g| g.part_of_speech == pos) {
                    Some(group) => group.meanings.extend(meanings),
                    None => definitions.push(DefinitionGroup {
                        part_of_speech: pos,
                        meanings,
                    }),
                }
            }

            for phonetic in entry.phonetics {
                let Some(text) = phonetic.text.filter(|t| !t.trim().is_empty()) else {
                    continue;
                };
                if pronunciations.iter().any(|p| p.text == text) {
                    continue;
                }
                pronunciations.push(Pronunciation {
                    text,
                    audio_ref: phonetic.audio.filter(|a| !a.is_empty()),
                });
            }
        }

        if definitions.is_empty() {
            return DictionaryEntry::not_found(word, language, PROVIDER_ID);
        }

        DictionaryEntry {
            word: word.to_string(),
            language,
            found: true,
            definitions,
            pronunciations,
            source: PROVIDER_ID.to_string(),
            degraded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {
        "word": "run",
        "phonetics": [
          {"text": "/ɹʌn/", "audio": "https://example.test/run-us.mp3"},
          {"text": "/ɹʌn/", "audio": ""},
          {"audio": ""}
        ],
        "meanings": [
          {"partOfSpeech": "verb", "definitions": [{"definition": "To move swiftly."}]},
          {"partOfSpeech": "noun", "definitions": [{"definition": "An act of running."}]}
        ]
      },
      {
        "word": "run",
        "phonetics": [],
        "meanings": [
          {"partOfSpeech": "Verb", "definitions": [{"definition": "To operate a machine."}, {"definition": "  "}]}
        ]
      }
    ]"#;

    fn provider() -> FreeDictionaryProvider {
        FreeDictionaryProvider::new(reqwest::Client::new())
    }

    #[test]
    fn test_adapt_folds_parts_of_speech() {
        let raw: Vec<FreeDictionaryRaw> = serde_json::from_str(SAMPLE).unwrap();
        let entry = provider().adapt("run", Language::En, raw);

        assert!(entry.found);
        assert_eq!(entry.source, PROVIDER_ID);
        assert_eq!(entry.definitions.len(), 2);
        assert_eq!(entry.definitions[0].part_of_speech, "verb");
        assert_eq!(
            entry.definitions[0].meanings,
            vec!["To move swiftly.", "To operate a machine."]
        );
        assert_eq!(entry.pronunciations.len(), 1);
        assert_eq!(
            entry.pronunciations[0].audio_ref.as_deref(),
            Some("https://example.test/run-us.mp3")
        );
    }

    #[test]
    fn test_adapt_without_definitions_is_not_found() {
        let raw: Vec<FreeDictionaryRaw> =
            serde_json::from_str(r#"[{"word": "zzz", "meanings": []}]"#).unwrap();
        let entry = provider().adapt("zzz", Language::En, raw);
        assert!(!entry.found);
        assert!(!entry.degraded);
    }

    #[test]
    fn test_entry_url_escapes_word() {
        let url = provider()
            .with_base_url("http://localhost:9000/")
            .entry_url("ice cream")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/v2/entries/en/ice%20cream"
        );
    }
}
