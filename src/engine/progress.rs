use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::VocabularyWord;

/// Lifetime counters for one word. Unlike the streak in the word history,
/// mastery here is based on the total number of correct answers and never
/// goes away once reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgressEntry {
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub total_seen: u32,
    #[serde(rename = "lastSeen", with = "chrono::serde::ts_milliseconds")]
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub article_correct: u32,
    #[serde(default)]
    pub article_attempts: u32,
    #[serde(default)]
    pub translation_correct: u32,
    #[serde(default)]
    pub translation_attempts: u32,
}

impl WordProgressEntry {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            correct_count: 0,
            total_seen: 0,
            last_seen_at: now,
            article_correct: 0,
            article_attempts: 0,
            translation_correct: 0,
            translation_attempts: 0,
        }
    }

    pub fn is_mastered(&self, threshold: u32) -> bool {
        self.correct_count >= threshold
    }

    /// Percentage of rounds answered fully correctly.
    pub fn accuracy(&self) -> f64 {
        percent(self.correct_count, self.total_seen)
    }

    pub fn article_accuracy(&self) -> f64 {
        percent(self.article_correct, self.article_attempts)
    }

    pub fn translation_accuracy(&self) -> f64 {
        percent(self.translation_correct, self.translation_attempts)
    }
}

pub(crate) fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordProgress {
    pub entries: HashMap<String, WordProgressEntry>,
}

impl WordProgress {
    pub fn get(&self, german: &str) -> Option<&WordProgressEntry> {
        self.entries.get(german)
    }

    /// Count one round for `german`. Skill counters move only when the
    /// corresponding outcome is present.
    pub fn update(
        &mut self,
        german: &str,
        is_correct: bool,
        article_correct: Option<bool>,
        translation_correct: Option<bool>,
        now: DateTime<Utc>,
    ) -> &WordProgressEntry {
        let entry = self
            .entries
            .entry(german.to_string())
            .or_insert_with(|| WordProgressEntry::new(now));

        entry.total_seen += 1;
        entry.last_seen_at = now;
        if is_correct {
            entry.correct_count += 1;
        }
        if let Some(correct) = article_correct {
            entry.article_attempts += 1;
            if correct {
                entry.article_correct += 1;
            }
        }
        if let Some(correct) = translation_correct {
            entry.translation_attempts += 1;
            if correct {
                entry.translation_correct += 1;
            }
        }
        entry
    }

    /// Every word whose correct count has reached `threshold`.
    pub fn mastered_set(&self, threshold: u32) -> HashSet<String> {
        self.entries
            .iter()
            .filter(|(_, p)| p.is_mastered(threshold))
            .map(|(german, _)| german.clone())
            .collect()
    }

    /// Sum of rounds played across all words.
    pub fn total_questions(&self) -> u32 {
        self.entries.values().map(|p| p.total_seen).sum()
    }

    /// Distinct UTC calendar days on which any word was last seen.
    pub fn days_studied(&self) -> usize {
        let days: BTreeSet<NaiveDate> = self
            .entries
            .values()
            .map(|p| p.last_seen_at.date_naive())
            .collect();
        days.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Words of the working vocabulary grouped by progress.
#[derive(Clone, Debug, Default)]
pub struct ProgressOverview<'a> {
    pub mastered: Vec<(&'a VocabularyWord, &'a WordProgressEntry)>,
    pub in_progress: Vec<(&'a VocabularyWord, &'a WordProgressEntry)>,
    pub not_started: Vec<&'a VocabularyWord>,
}

impl<'a> ProgressOverview<'a> {
    pub fn build(words: &'a [VocabularyWord], progress: &'a WordProgress, threshold: u32) -> Self {
        let mut overview = Self::default();
        for word in words {
            match progress.get(&word.german) {
                None => overview.not_started.push(word),
                Some(p) if p.is_mastered(threshold) => overview.mastered.push((word, p)),
                Some(p) => overview.in_progress.push((word, p)),
            }
        }
        overview
    }

    pub fn total(&self) -> usize {
        self.mastered.len() + self.in_progress.len() + self.not_started.len()
    }

    /// Mastered share of the vocabulary, rounded to a whole percent.
    pub fn completion_percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.mastered.len() as f64 / total as f64 * 100.0).round() as u32
    }
}
