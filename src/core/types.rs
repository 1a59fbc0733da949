// Data types shared by the catalog, the gateway and the HTTP handlers

use serde::{Deserialize, Serialize};

use crate::core::languages::language_name;

/// A language as offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: String,
    pub full_name: String,
}

impl Language {
    /// Resolve a display name from the static table, falling back to the code
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            full_name: language_name(code).unwrap_or(code).to_string(),
        }
    }
}

/// A supported translation direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub from: Language,
    pub to: Language,
}

impl LanguagePair {
    /// Parse a hyphen-joined pair code such as `en-es`.
    ///
    /// Splits on the first hyphen only. Returns `None` when there is no
    /// hyphen or either side is empty.
    pub fn from_pair_code(code: &str) -> Option<Self> {
        let (from, to) = code.split_once('-')?;
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self {
            from: Language::from_code(from),
            to: Language::from_code(to),
        })
    }

    /// The hyphen-joined code the remote API expects in `lang`
    pub fn code(&self) -> String {
        pair_code(&self.from.code, &self.to.code)
    }
}

pub fn pair_code(from: &str, to: &str) -> String {
    format!("{}-{}", from, to)
}

/// Dictionary lookup response, field names as the remote API sends them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryResult {
    /// Opaque response metadata
    #[serde(default)]
    pub head: serde_json::Value,
    #[serde(rename = "def", default)]
    pub definitions: Vec<Definition>,
}

impl DictionaryResult {
    /// True when the API knew nothing about the word
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub text: String,
    #[serde(rename = "pos", default)]
    pub part_of_speech: String,
    /// Transcription
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(rename = "tr", default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    #[serde(rename = "pos", default)]
    pub part_of_speech: String,
    #[serde(rename = "gen", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "fr", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(rename = "syn", default)]
    pub synonyms: Vec<Synonym>,
    #[serde(rename = "mean", default)]
    pub meanings: Vec<Meaning>,
    #[serde(rename = "ex", default)]
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synonym {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meaning {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    #[serde(rename = "tr", default)]
    pub translations: Vec<Translation>,
}
