pub mod builtin;
pub mod validate;
pub mod word;

use std::collections::HashSet;

pub use word::{Article, VocabularyWord};

/// Drop later entries whose German text matches an earlier one, ignoring case.
pub fn dedupe_words(words: impl IntoIterator<Item = VocabularyWord>) -> Vec<VocabularyWord> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|w| seen.insert(w.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let words = vec![
            VocabularyWord::noun("Haus", Article::Das, &["house"]),
            VocabularyWord::noun("Tisch", Article::Der, &["table"]),
            VocabularyWord::noun("haus", Article::Der, &["building"]),
        ];
        let unique = dedupe_words(words);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].article, Article::Das);
        assert_eq!(unique[1].german, "Tisch");
    }
}
