use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::json_store::default_data_dir;

pub const MIN_CHOICE_COUNT: usize = 2;
pub const MAX_CHOICE_COUNT: usize = 8;

/// Application configuration. Learning preferences (mastery threshold,
/// repetition slider) are user data and live in the store instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_choice_count")]
    pub choice_count: usize,
    #[serde(default = "default_guess_articles")]
    pub guess_articles: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}
fn default_choice_count() -> usize {
    4
}
fn default_guess_articles() -> bool {
    true
}
fn default_log_filter() -> String {
    "artikel_meister=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            choice_count: default_choice_count(),
            guess_articles: default_guess_articles(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("artikel-meister")
            .join("config.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn validate(&mut self) {
        self.choice_count = self.choice_count.clamp(MIN_CHOICE_COUNT, MAX_CHOICE_COUNT);
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir_string();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
    }
}
