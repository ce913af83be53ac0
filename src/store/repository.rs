use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::catalog::VocabularyWord;
use crate::engine::history::WordHistory;
use crate::engine::progress::WordProgress;
use crate::engine::stats::GameStats;
use crate::error::Error;
use crate::lists::custom::{CustomListCollection, CustomWordList};
use crate::settings::{ListSelectionSettings, ProgressSettings};
use crate::store::KeyValueStore;
use crate::store::schema::{
    CUSTOM_LISTS_KEY, EXPORT_VERSION, ExportData, GAME_STATS_KEY, LIST_SETTINGS_KEY, PROGRESS_KEY,
    SETTINGS_KEY, WORD_HISTORY_KEY,
};

/// Typed access to every persisted record. Loads never fail: a missing or
/// unreadable record comes back as its default.
pub struct ProgressRepository {
    store: Box<dyn KeyValueStore>,
}

impl ProgressRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.load(key) {
            Some(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("discarding unreadable {key}: {e}");
                T::default()
            }),
            None => T::default(),
        }
    }

    /// Load a per-word map entry by entry. A malformed entry is dropped on
    /// its own, so that word reads as never seen and the rest survive.
    fn load_entries<T: DeserializeOwned>(&self, key: &str) -> HashMap<String, T> {
        let raw: HashMap<String, Value> = self.load(key);
        raw.into_iter()
            .filter_map(|(german, value)| match serde_json::from_value(value) {
                Ok(entry) => Some((german, entry)),
                Err(e) => {
                    tracing::warn!("discarding unreadable {key} entry for {german}: {e}");
                    None
                }
            })
            .collect()
    }

    fn save<T: Serialize>(&mut self, key: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.store.save(key, &json)
    }

    pub fn load_progress(&self) -> WordProgress {
        WordProgress {
            entries: self.load_entries(PROGRESS_KEY),
        }
    }

    pub fn save_progress(&mut self, progress: &WordProgress) -> Result<()> {
        self.save(PROGRESS_KEY, progress)
    }

    pub fn load_settings(&self) -> ProgressSettings {
        self.load::<ProgressSettings>(SETTINGS_KEY).validated()
    }

    pub fn save_settings(&mut self, settings: &ProgressSettings) -> Result<()> {
        self.save(SETTINGS_KEY, &settings.clone().validated())
    }

    pub fn load_custom_lists(&self) -> CustomListCollection {
        self.load(CUSTOM_LISTS_KEY)
    }

    pub fn save_custom_lists(&mut self, lists: &CustomListCollection) -> Result<()> {
        self.save(CUSTOM_LISTS_KEY, lists)
    }

    pub fn load_list_settings(&self) -> ListSelectionSettings {
        self.load(LIST_SETTINGS_KEY)
    }

    pub fn save_list_settings(&mut self, settings: &ListSelectionSettings) -> Result<()> {
        self.save(LIST_SETTINGS_KEY, settings)
    }

    pub fn load_game_stats(&self) -> GameStats {
        self.load(GAME_STATS_KEY)
    }

    pub fn save_game_stats(&mut self, stats: &GameStats) -> Result<()> {
        self.save(GAME_STATS_KEY, stats)
    }

    pub fn load_word_history(&self) -> WordHistory {
        WordHistory {
            entries: self.load_entries(WORD_HISTORY_KEY),
        }
    }

    pub fn save_word_history(&mut self, history: &WordHistory) -> Result<()> {
        self.save(WORD_HISTORY_KEY, history)
    }

    /// Save a freshly generated list. It is not activated automatically.
    pub fn add_custom_list<R: Rng>(
        &mut self,
        topic: &str,
        difficulty: &str,
        words: Vec<VocabularyWord>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<CustomWordList> {
        let mut lists = self.load_custom_lists();
        let list = lists.add(topic, difficulty, words, now, rng).clone();
        self.save_custom_lists(&lists)?;
        Ok(list)
    }

    /// Delete a list and drop it from the active selection.
    pub fn remove_custom_list(&mut self, id: &str) -> Result<CustomWordList> {
        let mut lists = self.load_custom_lists();
        let mut selection = self.load_list_settings();
        let removed = lists.remove(id, &mut selection)?;
        self.save_custom_lists(&lists)?;
        self.save_list_settings(&selection)?;
        Ok(removed)
    }

    /// Enable or disable a saved list. Returns whether it is now active.
    pub fn toggle_custom_list(&mut self, id: &str) -> Result<bool> {
        if !self.load_custom_lists().contains(id) {
            return Err(Error::UnknownList(id.to_string()).into());
        }
        let mut selection = self.load_list_settings();
        let active = selection.toggle(id);
        self.save_list_settings(&selection)?;
        Ok(active)
    }

    /// Clear word progress, progress settings and word history.
    pub fn reset_all_progress(&mut self) -> Result<()> {
        self.store.remove(PROGRESS_KEY)?;
        self.store.remove(SETTINGS_KEY)?;
        self.store.remove(WORD_HISTORY_KEY)
    }

    pub fn reset_custom_lists(&mut self) -> Result<()> {
        self.store.remove(CUSTOM_LISTS_KEY)?;
        self.store.remove(LIST_SETTINGS_KEY)
    }

    pub fn reset_word_history(&mut self) -> Result<()> {
        self.store.remove(WORD_HISTORY_KEY)
    }

    pub fn reset_game_stats(&mut self) -> Result<()> {
        self.store.remove(GAME_STATS_KEY)
    }

    /// Un-master every word in the history, keeping exposure counts.
    pub fn reset_mastered(&mut self) -> Result<()> {
        let mut history = self.load_word_history();
        history.reset_mastered();
        self.save_word_history(&history)
    }

    pub fn export(&self, now: DateTime<Utc>) -> ExportData {
        ExportData::new(self.load_progress(), self.load_settings(), now)
    }

    /// Replace progress and settings with an export's contents.
    pub fn import(&mut self, data: &ExportData) -> Result<()> {
        if data.version != EXPORT_VERSION {
            return Err(Error::UnsupportedExportVersion {
                found: data.version,
                expected: EXPORT_VERSION,
            }
            .into());
        }
        let progress = data
            .progress
            .as_ref()
            .ok_or(Error::IncompleteExport("progress"))?;
        let settings = data
            .settings
            .as_ref()
            .ok_or(Error::IncompleteExport("settings"))?;

        self.save_progress(progress)?;
        self.save_settings(settings)?;
        tracing::info!("imported progress for {} words", progress.len());
        Ok(())
    }
}
