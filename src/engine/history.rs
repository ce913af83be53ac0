use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Streak-based mastery: a word is mastered after `threshold` consecutive
/// correct answers and falls back to learning on the next miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakMastery {
    Unseen,
    Learning,
    Mastered,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordHistoryEntry {
    #[serde(rename = "lastShown", with = "chrono::serde::ts_milliseconds")]
    pub last_shown_at: DateTime<Utc>,
    #[serde(default)]
    pub times_shown: u32,
    #[serde(default)]
    pub recently_incorrect: bool,
    #[serde(
        rename = "lastIncorrectTime",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_incorrect_at: Option<DateTime<Utc>>,
    #[serde(rename = "consecutiveCorrect", default)]
    pub consecutive_correct: u32,
    #[serde(default)]
    pub is_mastered: bool,
}

impl WordHistoryEntry {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_shown_at: now,
            times_shown: 0,
            recently_incorrect: false,
            last_incorrect_at: None,
            consecutive_correct: 0,
            is_mastered: false,
        }
    }

    pub fn record(&mut self, is_correct: bool, mastery_threshold: u32, now: DateTime<Utc>) {
        self.times_shown += 1;
        self.last_shown_at = now;

        if is_correct {
            self.consecutive_correct += 1;
            self.recently_incorrect = false;
            if self.consecutive_correct >= mastery_threshold {
                self.is_mastered = true;
            }
        } else {
            self.consecutive_correct = 0;
            self.recently_incorrect = true;
            self.last_incorrect_at = Some(now);
            self.is_mastered = false;
        }
    }
}

/// Per-word learning history, keyed by the word's German text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordHistory {
    pub entries: HashMap<String, WordHistoryEntry>,
}

impl WordHistory {
    pub fn get(&self, german: &str) -> Option<&WordHistoryEntry> {
        self.entries.get(german)
    }

    /// Apply one answer, creating the entry on first exposure.
    pub fn record_answer(
        &mut self,
        german: &str,
        is_correct: bool,
        mastery_threshold: u32,
        now: DateTime<Utc>,
    ) -> &WordHistoryEntry {
        let entry = self
            .entries
            .entry(german.to_string())
            .or_insert_with(|| WordHistoryEntry::new(now));
        entry.record(is_correct, mastery_threshold, now);
        if entry.is_mastered && entry.consecutive_correct == mastery_threshold {
            tracing::debug!("{german} reached a mastery streak of {mastery_threshold}");
        }
        entry
    }

    pub fn mastery(&self, german: &str) -> StreakMastery {
        match self.entries.get(german) {
            None => StreakMastery::Unseen,
            Some(e) if e.is_mastered => StreakMastery::Mastered,
            Some(_) => StreakMastery::Learning,
        }
    }

    /// Clear every mastery flag and streak, keeping exposure data.
    pub fn reset_mastered(&mut self) {
        for entry in self.entries.values_mut() {
            entry.is_mastered = false;
            entry.consecutive_correct = 0;
        }
    }

    pub fn mastered_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_mastered).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_answer_creates_entry() {
        let mut history = WordHistory::default();
        assert_eq!(history.mastery("Haus"), StreakMastery::Unseen);

        let entry = history.record_answer("Haus", true, 3, t0());
        assert_eq!(entry.times_shown, 1);
        assert_eq!(entry.consecutive_correct, 1);
        assert_eq!(entry.last_shown_at, t0());
        assert_eq!(history.mastery("Haus"), StreakMastery::Learning);
    }

    #[test]
    fn streak_reaches_mastery_then_miss_resets() {
        let mut history = WordHistory::default();
        for i in 0..3 {
            history.record_answer("Haus", true, 3, t0() + Duration::minutes(i));
        }
        assert_eq!(history.mastery("Haus"), StreakMastery::Mastered);

        let miss_at = t0() + Duration::minutes(10);
        let entry = history.record_answer("Haus", false, 3, miss_at);
        assert!(!entry.is_mastered);
        assert_eq!(entry.consecutive_correct, 0);
        assert!(entry.recently_incorrect);
        assert_eq!(entry.last_incorrect_at, Some(miss_at));
        assert_eq!(entry.times_shown, 4);
    }

    #[test]
    fn correct_answer_clears_recently_incorrect() {
        let mut history = WordHistory::default();
        history.record_answer("Tisch", false, 3, t0());
        let entry = history.record_answer("Tisch", true, 3, t0() + Duration::minutes(1));
        assert!(!entry.recently_incorrect);
        assert_eq!(entry.last_incorrect_at, Some(t0()));
    }

    #[test]
    fn threshold_one_masters_immediately() {
        let mut history = WordHistory::default();
        assert!(history.record_answer("Buch", true, 1, t0()).is_mastered);
    }

    #[test]
    fn reset_mastered_clears_flags_and_streaks() {
        let mut history = WordHistory::default();
        for _ in 0..3 {
            history.record_answer("Haus", true, 3, t0());
        }
        history.reset_mastered();
        let entry = history.get("Haus").unwrap();
        assert!(!entry.is_mastered);
        assert_eq!(entry.consecutive_correct, 0);
        assert_eq!(entry.times_shown, 3);
        assert_eq!(history.mastered_count(), 0);
    }

    #[test]
    fn serializes_with_millisecond_timestamps() {
        let mut history = WordHistory::default();
        history.record_answer("Haus", false, 3, t0());
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains(&format!(r#""lastShown":{}"#, t0().timestamp_millis())));
        assert!(json.contains(r#""consecutiveCorrect":0"#));

        let back: WordHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn missing_optional_fields_default() {
        let history: WordHistory =
            serde_json::from_str(r#"{"Haus": {"lastShown": 1700000000000}}"#).unwrap();
        let entry = history.get("Haus").unwrap();
        assert_eq!(entry.times_shown, 0);
        assert_eq!(entry.last_incorrect_at, None);
        assert!(!entry.is_mastered);
    }
}
