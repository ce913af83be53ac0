use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::VocabularyWord;

/// Multiple-choice options for a round: the word's primary translation plus
/// up to `count - 1` distinct primary translations of other words, shuffled.
pub fn translation_choices<R: Rng>(
    word: &VocabularyWord,
    vocabulary: &[VocabularyWord],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let answer = word.primary_translation();
    let mut seen: HashSet<&str> = HashSet::from([answer]);
    let mut distractors: Vec<&str> = vocabulary
        .iter()
        .filter(|w| w.dedup_key() != word.dedup_key())
        .map(VocabularyWord::primary_translation)
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect();
    distractors.shuffle(rng);

    let mut choices: Vec<String> = std::iter::once(answer)
        .chain(distractors.into_iter().take(count.saturating_sub(1)))
        .map(str::to_string)
        .collect();
    choices.shuffle(rng);
    choices
}
