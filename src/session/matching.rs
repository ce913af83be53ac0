//! Pair-matching mode: German words on one side, their primary translations
//! shuffled on the other. A correct match scores `10 + 2 * streak` and the
//! pair is replaced by a word not already on the board.

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::catalog::VocabularyWord;

pub const BOARD_SIZE: usize = 6;
const BASE_POINTS: u32 = 10;
const STREAK_BONUS: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct MatchPair {
    pub id: u64,
    pub word: VocabularyWord,
}

impl MatchPair {
    pub fn english(&self) -> &str {
        self.word.primary_translation()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchScore {
    pub score: u32,
    pub streak: u32,
    pub completed_pairs: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MatchResult {
    Matched { word: VocabularyWord, points: u32 },
    Mismatch,
}

pub fn match_points(streak: u32) -> u32 {
    BASE_POINTS + streak * STREAK_BONUS
}

pub struct MatchingGame {
    vocabulary: Vec<VocabularyWord>,
    board: Vec<MatchPair>,
    /// Display order of the English column, by pair id.
    english_order: Vec<u64>,
    next_id: u64,
    score: MatchScore,
    rng: SmallRng,
}

impl MatchingGame {
    pub fn new(vocabulary: Vec<VocabularyWord>, rng: SmallRng) -> Self {
        let mut game = Self {
            vocabulary,
            board: Vec::with_capacity(BOARD_SIZE),
            english_order: Vec::with_capacity(BOARD_SIZE),
            next_id: 0,
            score: MatchScore::default(),
            rng,
        };
        while game.board.len() < BOARD_SIZE && game.refill() {}
        game
    }

    pub fn score(&self) -> MatchScore {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.board.is_empty()
    }

    pub fn german_column(&self) -> &[MatchPair] {
        &self.board
    }

    pub fn english_column(&self) -> Vec<&MatchPair> {
        self.english_order
            .iter()
            .filter_map(|id| self.pair(*id))
            .collect()
    }

    fn pair(&self, id: u64) -> Option<&MatchPair> {
        self.board.iter().find(|p| p.id == id)
    }

    /// Pair a German entry with an English entry. `None` when either id is
    /// not on the board; nothing changes in that case.
    pub fn try_match(&mut self, german_id: u64, english_id: u64) -> Option<MatchResult> {
        self.pair(german_id)?;
        self.pair(english_id)?;

        if german_id != english_id {
            self.score.streak = 0;
            return Some(MatchResult::Mismatch);
        }

        let points = match_points(self.score.streak);
        self.score.score += points;
        self.score.streak += 1;
        self.score.completed_pairs += 1;

        let index = self.board.iter().position(|p| p.id == german_id)?;
        let matched = self.board.remove(index);
        self.english_order.retain(|id| *id != german_id);
        self.refill();

        tracing::debug!(points, streak = self.score.streak, "matched {}", matched.word.german);
        Some(MatchResult::Matched {
            word: matched.word,
            points,
        })
    }

    /// Add one random word whose German text and translation are both absent
    /// from the board. Returns false when no such word exists.
    fn refill(&mut self) -> bool {
        let on_board: HashSet<&str> = self
            .board
            .iter()
            .flat_map(|p| [p.word.german.as_str(), p.english()])
            .collect();
        let available: Vec<&VocabularyWord> = self
            .vocabulary
            .iter()
            .filter(|w| !w.primary_translation().is_empty())
            .filter(|w| {
                !on_board.contains(w.german.as_str()) && !on_board.contains(w.primary_translation())
            })
            .collect();
        let Some(word) = available.choose(&mut self.rng).map(|w| (*w).clone()) else {
            return false;
        };

        let id = self.next_id;
        self.next_id += 1;
        self.board.push(MatchPair { id, word });
        let slot = self.rng.gen_range(0..=self.english_order.len());
        self.english_order.insert(slot, id);
        true
    }
}
