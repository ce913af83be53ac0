use std::collections::HashSet;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::catalog::builtin::built_in_words;
use crate::catalog::{Article, VocabularyWord};
use crate::engine::clock::Clock;
use crate::engine::evaluate::{Evaluation, evaluate_answer, requires_article};
use crate::engine::history::{WordHistory, WordHistoryEntry};
use crate::engine::progress::{ProgressOverview, WordProgress};
use crate::engine::selector::{PoolCounts, pool_counts, select_next};
use crate::engine::stats::GameStats;
use crate::lists::consolidate::{ActiveListsInfo, active_lists_info, consolidate};
use crate::lists::custom::{CustomListCollection, CustomWordList};
use crate::session::choices::translation_choices;
use crate::session::matching::MatchingGame;
use crate::settings::ProgressSettings;
use crate::store::repository::ProgressRepository;

#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    pub choice_count: usize,
    pub guess_articles: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            choice_count: 4,
            guess_articles: true,
        }
    }
}

/// The question currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub word: VocabularyWord,
    pub choices: Vec<String>,
    pub requires_article: bool,
}

#[derive(Clone, Debug)]
pub struct RoundOutcome {
    pub word: VocabularyWord,
    pub evaluation: Evaluation,
    pub streak: u32,
    pub history: WordHistoryEntry,
    pub newly_mastered: bool,
}

/// One player's game: loaded state, the working vocabulary, and the round
/// loop. Every answer is written back to the store before the next round.
pub struct GameSession {
    repo: ProgressRepository,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    options: SessionOptions,
    built_in: Vec<VocabularyWord>,
    words: Vec<VocabularyWord>,
    settings: ProgressSettings,
    history: WordHistory,
    progress: WordProgress,
    stats: GameStats,
    streak: u32,
    current: Option<Round>,
}

impl GameSession {
    pub fn new(
        repo: ProgressRepository,
        clock: Box<dyn Clock>,
        rng: SmallRng,
        options: SessionOptions,
    ) -> Self {
        Self::with_built_in(repo, clock, rng, options, built_in_words())
    }

    pub fn with_built_in(
        repo: ProgressRepository,
        clock: Box<dyn Clock>,
        rng: SmallRng,
        options: SessionOptions,
        built_in: Vec<VocabularyWord>,
    ) -> Self {
        let settings = repo.load_settings();
        let history = repo.load_word_history();
        let progress = repo.load_progress();
        let stats = repo.load_game_stats();

        let mut session = Self {
            repo,
            clock,
            rng,
            options,
            built_in,
            words: Vec::new(),
            settings,
            history,
            progress,
            stats,
            streak: 0,
            current: None,
        };
        session.reload_words();
        session
    }

    /// Rebuild the working vocabulary from the saved lists and selection.
    pub fn reload_words(&mut self) {
        let lists = self.repo.load_custom_lists();
        let selection = self.repo.load_list_settings();
        self.words = consolidate(&self.built_in, &lists, &selection);
        tracing::debug!("working vocabulary has {} words", self.words.len());
    }

    /// Re-read every persisted record, e.g. after an import or reset.
    pub fn reload(&mut self) {
        self.settings = self.repo.load_settings();
        self.history = self.repo.load_word_history();
        self.progress = self.repo.load_progress();
        self.stats = self.repo.load_game_stats();
        self.current = None;
        self.reload_words();
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn custom_lists(&self) -> CustomListCollection {
        self.repo.load_custom_lists()
    }

    pub fn add_custom_list(
        &mut self,
        topic: &str,
        difficulty: &str,
        words: Vec<VocabularyWord>,
    ) -> Result<CustomWordList> {
        let now = self.clock.now();
        let list = self
            .repo
            .add_custom_list(topic, difficulty, words, now, &mut self.rng)?;
        self.reload_words();
        Ok(list)
    }

    pub fn remove_custom_list(&mut self, id: &str) -> Result<CustomWordList> {
        let removed = self.repo.remove_custom_list(id)?;
        self.reload_words();
        Ok(removed)
    }

    pub fn toggle_custom_list(&mut self, id: &str) -> Result<bool> {
        let active = self.repo.toggle_custom_list(id)?;
        self.reload_words();
        Ok(active)
    }

    /// Flip whether the built-in catalog is part of the working vocabulary.
    pub fn toggle_built_in(&mut self) -> Result<bool> {
        let mut selection = self.repo.load_list_settings();
        selection.include_built_in = !selection.include_built_in;
        self.repo.save_list_settings(&selection)?;
        self.reload_words();
        Ok(selection.include_built_in)
    }

    pub fn active_lists_info(&self) -> ActiveListsInfo {
        let lists = self.repo.load_custom_lists();
        let selection = self.repo.load_list_settings();
        active_lists_info(&self.built_in, &lists, &selection)
    }

    /// Words in play. Falls back to the built-in catalog when every list
    /// is disabled or empty.
    pub fn words(&self) -> &[VocabularyWord] {
        if self.words.is_empty() {
            &self.built_in
        } else {
            &self.words
        }
    }

    /// A pair-matching board over the working vocabulary. Matching rounds
    /// are not recorded in history, progress or stats.
    pub fn matching_game(&mut self) -> MatchingGame {
        let rng = SmallRng::seed_from_u64(self.rng.r#gen());
        MatchingGame::new(self.words().to_vec(), rng)
    }

    /// Choose the next word and build its round.
    pub fn next_round(&mut self) -> Option<&Round> {
        let now = self.clock.now();
        let vocabulary = if self.words.is_empty() {
            &self.built_in
        } else {
            &self.words
        };
        let word = select_next(vocabulary, &self.history, &self.settings, now, &mut self.rng)?;

        let choices =
            translation_choices(word, vocabulary, self.options.choice_count, &mut self.rng);
        let round = Round {
            requires_article: requires_article(word, self.options.guess_articles),
            word: word.clone(),
            choices,
        };
        self.current = Some(round);
        self.current.as_ref()
    }

    /// Grade the current round, update history, progress and stats, and
    /// persist them.
    pub fn answer(&mut self, article: Option<Article>, translation: &str) -> Result<RoundOutcome> {
        let Some(round) = self.current.take() else {
            bail!("No round in progress");
        };
        let now = self.clock.now();
        let evaluation = evaluate_answer(
            &round.word,
            article,
            translation,
            round.requires_article,
        );

        let streak = if evaluation.is_correct {
            self.streak + 1
        } else {
            0
        };

        // Updates go to copies and are committed only after all three
        // records are saved. On failure the round stays open.
        let threshold = self.settings.mastery_threshold;
        let was_mastered = self
            .history
            .get(&round.word.german)
            .is_some_and(|e| e.is_mastered);
        let mut history = self.history.clone();
        let entry = history
            .record_answer(&round.word.german, evaluation.is_correct, threshold, now)
            .clone();
        let mut progress = self.progress.clone();
        progress.update(
            &round.word.german,
            evaluation.is_correct,
            evaluation.article_correct,
            Some(evaluation.translation_correct),
            now,
        );
        let mut stats = self.stats.clone();
        stats.record_evaluation(&evaluation, streak, now);

        let saved = self
            .repo
            .save_word_history(&history)
            .and_then(|()| self.repo.save_progress(&progress))
            .and_then(|()| self.repo.save_game_stats(&stats));
        if let Err(e) = saved {
            tracing::warn!("could not save answer for {}: {e}", round.word.german);
            self.current = Some(round);
            return Err(e);
        }

        self.history = history;
        self.progress = progress;
        self.stats = stats;
        self.streak = streak;

        tracing::debug!(
            correct = evaluation.is_correct,
            streak,
            "answered {}",
            round.word.german
        );

        Ok(RoundOutcome {
            newly_mastered: entry.is_mastered && !was_mastered,
            word: round.word,
            evaluation,
            streak,
            history: entry,
        })
    }

    pub fn settings(&self) -> &ProgressSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: ProgressSettings) -> Result<()> {
        self.settings = settings.validated();
        self.repo.save_settings(&self.settings)
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn history(&self) -> &WordHistory {
        &self.history
    }

    pub fn progress(&self) -> &WordProgress {
        &self.progress
    }

    pub fn pool_counts(&self) -> PoolCounts {
        pool_counts(self.words(), &self.history, self.clock.now())
    }

    /// Words mastered by lifetime correct count (never revoked).
    pub fn mastered_words(&self) -> HashSet<String> {
        self.progress.mastered_set(self.settings.mastery_threshold)
    }

    pub fn overview(&self) -> ProgressOverview<'_> {
        ProgressOverview::build(self.words(), &self.progress, self.settings.mastery_threshold)
    }

    pub fn repository(&self) -> &ProgressRepository {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut ProgressRepository {
        &mut self.repo
    }
}
