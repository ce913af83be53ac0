use std::fmt;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Article {
    #[serde(rename = "der")]
    Der,
    #[serde(rename = "die")]
    Die,
    #[serde(rename = "das")]
    Das,
    /// Verbs, adjectives and other words without a grammatical article.
    #[default]
    #[serde(rename = "", alias = "none")]
    None,
}

impl Article {
    pub const ALL: [Article; 3] = [Article::Der, Article::Die, Article::Das];

    pub fn as_str(self) -> &'static str {
        match self {
            Article::Der => "der",
            Article::Die => "die",
            Article::Das => "das",
            Article::None => "",
        }
    }

    /// Parse user or generator input. Anything that is not der/die/das is `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "der" => Article::Der,
            "die" => Article::Die,
            "das" => Article::Das,
            _ => Article::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Article::None
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_word_class() -> String {
    "noun".to_string()
}

/// A single vocabulary entry. Field names on the wire match the lists
/// produced by the vocabulary generator (`type`, `english`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub german: String,
    #[serde(default)]
    pub article: Article,
    #[serde(rename = "type", default = "default_word_class")]
    pub word_class: String,
    pub english: Vec<String>,
}

impl VocabularyWord {
    pub fn new(german: &str, article: Article, word_class: &str, english: &[&str]) -> Self {
        Self {
            german: german.to_string(),
            article,
            word_class: word_class.to_string(),
            english: english.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn noun(german: &str, article: Article, english: &[&str]) -> Self {
        Self::new(german, article, "noun", english)
    }

    /// The translation answers are checked against.
    pub fn primary_translation(&self) -> &str {
        self.english.first().map(String::as_str).unwrap_or("")
    }

    pub fn has_article(&self) -> bool {
        !self.article.is_none()
    }

    /// Case-insensitive identity used for deduplication across lists.
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.german)
    }

    pub fn display_with_article(&self) -> String {
        if self.has_article() {
            format!("{} {}", self.article, self.german)
        } else {
            self.german.clone()
        }
    }
}

/// NFC-normalize then lowercase, so "Küche" typed with a combining
/// diaeresis collides with the precomposed form.
pub fn dedup_key(german: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(german).to_lowercase()
}
