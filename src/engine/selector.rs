//! Adaptive choice of the next word.
//!
//! Every available word is sorted into one of five pools based on its
//! history: recently missed, recently shown, fresh (seen before, not
//! recently), never seen, and mastered. Each pool carries a per-word weight
//! derived from the repetition preference, and the next word is drawn with
//! probability proportional to its pool's weight.
//!
//! The repetition side of the slider is squared so that high settings
//! dominate sharply near the top, while the variety pools decay with a
//! square root and keep some exploration alive at moderate settings.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::VocabularyWord;
use crate::engine::history::{WordHistory, WordHistoryEntry};
use crate::settings::ProgressSettings;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;
const RECENTLY_INCORRECT_WINDOW_MS: i64 = DAY_MS;
const RECENTLY_SHOWN_WINDOW_MS: i64 = HOUR_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pool {
    RecentlyIncorrect,
    RecentlyShown,
    Fresh,
    NeverSeen,
    Mastered,
}

impl Pool {
    /// Order in which pools are laid out in the weighted candidate list.
    pub const ALL: [Pool; 5] = [
        Pool::RecentlyIncorrect,
        Pool::RecentlyShown,
        Pool::Fresh,
        Pool::NeverSeen,
        Pool::Mastered,
    ];

    fn index(self) -> usize {
        match self {
            Pool::RecentlyIncorrect => 0,
            Pool::RecentlyShown => 1,
            Pool::Fresh => 2,
            Pool::NeverSeen => 3,
            Pool::Mastered => 4,
        }
    }
}

fn millis_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_milliseconds()
}

/// The pool a word belongs to, without regard to whether mastered words are
/// currently eligible.
pub fn classify(entry: Option<&WordHistoryEntry>, now: DateTime<Utc>) -> Pool {
    let Some(entry) = entry else {
        return Pool::NeverSeen;
    };
    if entry.is_mastered {
        return Pool::Mastered;
    }
    let missed_recently = entry.recently_incorrect
        && entry
            .last_incorrect_at
            .is_some_and(|t| millis_since(t, now) < RECENTLY_INCORRECT_WINDOW_MS);
    if missed_recently {
        Pool::RecentlyIncorrect
    } else if millis_since(entry.last_shown_at, now) < RECENTLY_SHOWN_WINDOW_MS {
        Pool::RecentlyShown
    } else {
        Pool::Fresh
    }
}

/// Like [`classify`], but mastered words only count when the feature is on
/// and they have rested for the configured number of days.
fn eligible_pool(
    entry: Option<&WordHistoryEntry>,
    settings: &ProgressSettings,
    now: DateTime<Utc>,
) -> Option<Pool> {
    match classify(entry, now) {
        Pool::Mastered => {
            let entry = entry?;
            let days_since_shown = millis_since(entry.last_shown_at, now) as f64 / DAY_MS as f64;
            let rested = days_since_shown >= settings.mastered_words_reset_days as f64;
            (settings.mastered_words_enabled && rested).then_some(Pool::Mastered)
        }
        pool => Some(pool),
    }
}

/// Per-word weight of each pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolWeights {
    pub incorrect: f64,
    pub recent: f64,
    pub fresh: f64,
    pub never_seen: f64,
    pub mastered: f64,
}

impl PoolWeights {
    /// `preference` is the repetition ratio in [0, 1]; out-of-range values
    /// are clamped so every weight stays non-negative.
    pub fn from_preference(preference: f64) -> Self {
        let p = if preference.is_nan() {
            0.0
        } else {
            preference.clamp(0.0, 1.0)
        };
        let repetition = p.powi(2);
        let variety = (1.0 - p).sqrt();
        Self {
            incorrect: 0.15 + repetition * 5.0,
            recent: repetition * 2.0,
            fresh: 0.4 * variety,
            never_seen: 0.6 * variety,
            mastered: repetition * 0.5,
        }
    }

    pub fn from_settings(settings: &ProgressSettings) -> Self {
        Self::from_preference(settings.preference_ratio())
    }

    pub fn weight(&self, pool: Pool) -> f64 {
        match pool {
            Pool::RecentlyIncorrect => self.incorrect,
            Pool::RecentlyShown => self.recent,
            Pool::Fresh => self.fresh,
            Pool::NeverSeen => self.never_seen,
            Pool::Mastered => self.mastered,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate<'a> {
    word: &'a VocabularyWord,
    pool: Pool,
    weight: f64,
}

fn weighted_candidates<'a>(
    available: &'a [VocabularyWord],
    history: &WordHistory,
    settings: &ProgressSettings,
    now: DateTime<Utc>,
) -> Vec<Candidate<'a>> {
    let weights = PoolWeights::from_settings(settings);
    let mut pools: [Vec<&'a VocabularyWord>; 5] = Default::default();
    for word in available {
        if let Some(pool) = eligible_pool(history.get(&word.german), settings, now) {
            pools[pool.index()].push(word);
        }
    }

    Pool::ALL
        .iter()
        .flat_map(|&pool| {
            let weight = weights.weight(pool);
            pools[pool.index()]
                .iter()
                .map(move |&word| Candidate { word, pool, weight })
        })
        .collect()
}

/// Pick the next word to quiz. Returns `None` only for an empty vocabulary.
pub fn select_next<'a, R: Rng>(
    available: &'a [VocabularyWord],
    history: &WordHistory,
    settings: &ProgressSettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<&'a VocabularyWord> {
    if available.is_empty() {
        return None;
    }

    let candidates = weighted_candidates(available, history, settings, now);
    if candidates.is_empty() {
        tracing::debug!("no eligible candidates, picking uniformly from all words");
        return available.choose(rng);
    }

    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    let picked = if total <= 0.0 || !total.is_finite() {
        candidates.choose(rng).copied()
    } else {
        let mut roll = rng.gen_range(0.0..total);
        candidates
            .iter()
            .find(|c| {
                roll -= c.weight;
                roll <= 0.0
            })
            .or(candidates.last())
            .copied()
    };

    picked.map(|c| {
        tracing::debug!(pool = ?c.pool, weight = c.weight, "selected {}", c.word.german);
        c.word
    })
}

/// How many words currently sit in each pool. Mastered words are counted
/// whether or not they are eligible for selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolCounts {
    pub incorrect: usize,
    pub recent: usize,
    pub fresh: usize,
    pub mastered: usize,
    pub never_seen: usize,
}

pub fn pool_counts(
    available: &[VocabularyWord],
    history: &WordHistory,
    now: DateTime<Utc>,
) -> PoolCounts {
    let mut counts = PoolCounts::default();
    for word in available {
        match classify(history.get(&word.german), now) {
            Pool::RecentlyIncorrect => counts.incorrect += 1,
            Pool::RecentlyShown => counts.recent += 1,
            Pool::Fresh => counts.fresh += 1,
            Pool::NeverSeen => counts.never_seen += 1,
            Pool::Mastered => counts.mastered += 1,
        }
    }
    counts
}
