use std::collections::HashSet;

use crate::catalog::{VocabularyWord, dedupe_words};
use crate::lists::custom::CustomListCollection;
use crate::settings::ListSelectionSettings;

/// Merge the built-in catalog and the active custom lists into one working
/// vocabulary. Built-in words come first, then each active list in stored
/// order; the first spelling of a word (case-insensitive) wins.
pub fn consolidate(
    built_in: &[VocabularyWord],
    lists: &CustomListCollection,
    settings: &ListSelectionSettings,
) -> Vec<VocabularyWord> {
    let built_in_words: &[VocabularyWord] = if settings.include_built_in {
        built_in
    } else {
        &[]
    };
    let custom_words = lists
        .iter()
        .filter(|list| settings.is_active(&list.id))
        .flat_map(|list| list.words.iter());

    dedupe_words(built_in_words.iter().chain(custom_words).cloned())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveListsInfo {
    pub total_words: usize,
    pub active_list_names: Vec<String>,
}

/// Summary for the lists banner. The built-in entry counts only the built-in
/// words that survive deduplication; custom lists report their saved size.
pub fn active_lists_info(
    built_in: &[VocabularyWord],
    lists: &CustomListCollection,
    settings: &ListSelectionSettings,
) -> ActiveListsInfo {
    let mut info = ActiveListsInfo::default();

    if settings.include_built_in {
        let built_in_keys: HashSet<String> = built_in.iter().map(|w| w.dedup_key()).collect();
        let count = consolidate(built_in, lists, settings)
            .iter()
            .filter(|w| built_in_keys.contains(&w.dedup_key()))
            .count();
        info.active_list_names.push(format!("{count} Common Words"));
        info.total_words += count;
    }

    for list in lists.iter().filter(|list| settings.is_active(&list.id)) {
        info.active_list_names.push(list.name.clone());
        info.total_words += list.word_count;
    }

    info
}
