//! Sanitizing vocabulary lists returned by the topic generator.
//!
//! The generator is an external language model and its output is only
//! loosely shaped. Entries without German text, a word class, or at least one
//! translation are dropped here so that nothing malformed reaches list
//! consolidation or the selector.

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{Article, VocabularyWord, dedupe_words};

const DEFAULT_DIFFICULTY: &str = "intermediate";

/// One word as the generator returned it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawWord {
    #[serde(default)]
    pub german: Option<String>,
    #[serde(default)]
    pub article: Option<Value>,
    #[serde(default, rename = "type")]
    pub word_class: Option<String>,
    #[serde(default)]
    pub english: Option<Vec<Value>>,
}

/// Response body of the topic vocabulary endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicVocabularyResponse {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub words: Vec<RawWord>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedList {
    pub topic: String,
    pub difficulty: String,
    pub words: Vec<VocabularyWord>,
    pub warning: Option<String>,
    pub finish_reason: Option<String>,
    pub dropped: usize,
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn validate_word(raw: &RawWord) -> Option<VocabularyWord> {
    let german = raw.german.as_deref().and_then(non_empty)?;
    let word_class = raw.word_class.as_deref().and_then(non_empty)?;
    let english: Vec<String> = raw
        .english
        .as_ref()?
        .iter()
        .filter_map(|v| v.as_str().and_then(non_empty))
        .collect();
    if english.is_empty() {
        return None;
    }
    let article = raw
        .article
        .as_ref()
        .and_then(Value::as_str)
        .map(Article::parse)
        .unwrap_or(Article::None);

    Some(VocabularyWord {
        german,
        article,
        word_class,
        english,
    })
}

/// Filter, normalize and deduplicate a generator response. `requested` is the
/// word count the caller asked for; a shortfall produces a warning unless the
/// generator already supplied one.
pub fn validate_response(response: TopicVocabularyResponse, requested: usize) -> ValidatedList {
    let total = response.words.len();
    let valid: Vec<VocabularyWord> = response.words.iter().filter_map(validate_word).collect();
    let words = dedupe_words(valid);
    let dropped = total - words.len();
    if dropped > 0 {
        tracing::debug!("dropped {dropped} malformed or duplicate generated words");
    }

    let warning = response.warning.or_else(|| {
        (requested > 0 && words.len() < requested).then(|| {
            format!(
                "Partial result: Generated {} out of {} requested words",
                words.len(),
                requested
            )
        })
    });

    ValidatedList {
        topic: response.topic,
        difficulty: response
            .difficulty
            .and_then(|d| non_empty(&d))
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        words,
        warning,
        finish_reason: response.finish_reason,
        dropped,
    }
}
