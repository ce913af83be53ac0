use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_MASTERY_THRESHOLD: u32 = 1;
pub const MAX_MASTERY_THRESHOLD: u32 = 20;
pub const MAX_REPETITION_PREFERENCE: u32 = 100;
pub const MIN_RESET_DAYS: u32 = 1;
pub const MAX_RESET_DAYS: u32 = 365;

/// Learning preferences shared by both mastery trackers and the selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSettings {
    #[serde(
        default = "default_mastery_threshold",
        deserialize_with = "saturating_u32"
    )]
    pub mastery_threshold: u32,
    /// 0 = maximum variety, 100 = maximum repetition.
    #[serde(
        default = "default_repetition_preference",
        deserialize_with = "saturating_u32"
    )]
    pub repetition_preference: u32,
    #[serde(default)]
    pub mastered_words_enabled: bool,
    /// Days after which a mastered word may reappear.
    #[serde(
        default = "default_mastered_words_reset_days",
        deserialize_with = "saturating_u32"
    )]
    pub mastered_words_reset_days: u32,
}

/// Accept any JSON number: negatives become 0, fractions round, huge
/// values cap at `u32::MAX`. `validate` then clamps into range.
fn saturating_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value.round() as u32)
}

fn default_mastery_threshold() -> u32 {
    3
}
fn default_repetition_preference() -> u32 {
    50
}
fn default_mastered_words_reset_days() -> u32 {
    7
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            mastery_threshold: default_mastery_threshold(),
            repetition_preference: default_repetition_preference(),
            mastered_words_enabled: false,
            mastered_words_reset_days: default_mastered_words_reset_days(),
        }
    }
}

impl ProgressSettings {
    /// Clamp every field into its legal range. Call after deserializing or
    /// after applying user edits.
    pub fn validate(&mut self) {
        self.mastery_threshold = self
            .mastery_threshold
            .clamp(MIN_MASTERY_THRESHOLD, MAX_MASTERY_THRESHOLD);
        self.repetition_preference = self.repetition_preference.min(MAX_REPETITION_PREFERENCE);
        self.mastered_words_reset_days = self
            .mastered_words_reset_days
            .clamp(MIN_RESET_DAYS, MAX_RESET_DAYS);
    }

    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }

    /// Repetition preference as a ratio in [0, 1].
    pub fn preference_ratio(&self) -> f64 {
        (self.repetition_preference as f64 / 100.0).clamp(0.0, 1.0)
    }
}

/// Which word lists feed the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSelectionSettings {
    #[serde(default)]
    pub active_list_ids: Vec<String>,
    #[serde(default = "default_include_built_in", alias = "includeDefault")]
    pub include_built_in: bool,
}

fn default_include_built_in() -> bool {
    true
}

impl Default for ListSelectionSettings {
    fn default() -> Self {
        Self {
            active_list_ids: Vec::new(),
            include_built_in: default_include_built_in(),
        }
    }
}

impl ListSelectionSettings {
    pub fn is_active(&self, list_id: &str) -> bool {
        self.active_list_ids.iter().any(|id| id == list_id)
    }

    /// Enable or disable a list. Returns the new state.
    pub fn toggle(&mut self, list_id: &str) -> bool {
        if self.is_active(list_id) {
            self.deactivate(list_id);
            false
        } else {
            self.active_list_ids.push(list_id.to_string());
            true
        }
    }

    pub fn deactivate(&mut self, list_id: &str) {
        self.active_list_ids.retain(|id| id != list_id);
    }
}
