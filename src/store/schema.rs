use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::progress::WordProgress;
use crate::settings::ProgressSettings;

pub const PROGRESS_KEY: &str = "artikel-meister-progress";
pub const SETTINGS_KEY: &str = "artikel-meister-settings";
pub const CUSTOM_LISTS_KEY: &str = "artikel-meister-custom-lists";
pub const LIST_SETTINGS_KEY: &str = "artikel-meister-list-settings";
pub const GAME_STATS_KEY: &str = "artikel-meister-game-stats";
pub const WORD_HISTORY_KEY: &str = "artikel-meister-word-history";

pub const EXPORT_VERSION: u32 = 1;

fn default_export_version() -> u32 {
    EXPORT_VERSION
}

/// Portable progress backup. Exports written before versioning carry no
/// version field and are read as version 1.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default = "default_export_version")]
    pub version: u32,
    #[serde(default)]
    pub progress: Option<WordProgress>,
    #[serde(default)]
    pub settings: Option<ProgressSettings>,
    pub export_date: DateTime<Utc>,
}

impl ExportData {
    pub fn new(progress: WordProgress, settings: ProgressSettings, now: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            progress: Some(progress),
            settings: Some(settings),
            export_date: now,
        }
    }

    /// Suggested file name, e.g. `artikel-meister-progress-2025-06-15.json`.
    pub fn file_name(&self) -> String {
        format!(
            "artikel-meister-progress-{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}
