use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::evaluate::Evaluation;
use crate::engine::progress::percent;

/// Lifetime game counters. Only an explicit reset clears them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub articles_correct: u32,
    #[serde(default)]
    pub articles_attempted: u32,
    #[serde(default)]
    pub translations_correct: u32,
    #[serde(default)]
    pub translations_attempted: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_played: DateTime<Utc>,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl GameStats {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_questions: 0,
            correct_answers: 0,
            current_streak: 0,
            best_streak: 0,
            articles_correct: 0,
            articles_attempted: 0,
            translations_correct: 0,
            translations_attempted: 0,
            start_date: now,
            last_played: now,
        }
    }

    /// Fold one round into the totals. `new_streak` is the caller's streak
    /// after this round.
    pub fn record_round(
        &mut self,
        is_correct: bool,
        new_streak: u32,
        article_correct: Option<bool>,
        translation_correct: Option<bool>,
        now: DateTime<Utc>,
    ) {
        self.total_questions += 1;
        self.last_played = now;
        if is_correct {
            self.correct_answers += 1;
        }

        self.current_streak = new_streak;
        self.best_streak = self.best_streak.max(new_streak);

        if let Some(correct) = article_correct {
            self.articles_attempted += 1;
            if correct {
                self.articles_correct += 1;
            }
        }
        if let Some(correct) = translation_correct {
            self.translations_attempted += 1;
            if correct {
                self.translations_correct += 1;
            }
        }
    }

    pub fn record_evaluation(&mut self, eval: &Evaluation, new_streak: u32, now: DateTime<Utc>) {
        self.record_round(
            eval.is_correct,
            new_streak,
            eval.article_correct,
            Some(eval.translation_correct),
            now,
        );
    }

    pub fn accuracy(&self) -> f64 {
        percent(self.correct_answers, self.total_questions)
    }

    pub fn article_accuracy(&self) -> f64 {
        percent(self.articles_correct, self.articles_attempted)
    }

    pub fn translation_accuracy(&self) -> f64 {
        percent(self.translations_correct, self.translations_attempted)
    }
}
