use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::VocabularyWord;
use crate::error::Error;
use crate::settings::ListSelectionSettings;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A user-saved topical word list. Words are fixed at creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomWordList {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub difficulty: String,
    pub words: Vec<VocabularyWord>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub word_count: usize,
}

impl CustomWordList {
    pub fn new<R: Rng>(
        topic: &str,
        difficulty: &str,
        words: Vec<VocabularyWord>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        Self {
            id: generate_list_id(now, rng),
            name: topic.to_string(),
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            word_count: words.len(),
            words,
            created_at: now,
        }
    }
}

/// `custom-<unix millis>-<9 base36 chars>`
pub fn generate_list_id<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("custom-{}-{}", now.timestamp_millis(), suffix)
}

/// The user's saved lists, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomListCollection {
    pub lists: Vec<CustomWordList>,
}

impl CustomListCollection {
    pub fn get(&self, id: &str) -> Option<&CustomWordList> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn add<R: Rng>(
        &mut self,
        topic: &str,
        difficulty: &str,
        words: Vec<VocabularyWord>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> &CustomWordList {
        let list = CustomWordList::new(topic, difficulty, words, now, rng);
        tracing::info!("saved list {} ({} words)", list.id, list.word_count);
        self.lists.push(list);
        &self.lists[self.lists.len() - 1]
    }

    /// Delete a list and drop it from the active selection.
    pub fn remove(
        &mut self,
        id: &str,
        selection: &mut ListSelectionSettings,
    ) -> Result<CustomWordList, Error> {
        let idx = self
            .lists
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::UnknownList(id.to_string()))?;
        selection.deactivate(id);
        Ok(self.lists.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomWordList> {
        self.lists.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::Article;

    fn words() -> Vec<VocabularyWord> {
        vec![
            VocabularyWord::noun("Koch", Article::Der, &["cook"]),
            VocabularyWord::noun("Pfanne", Article::Die, &["pan"]),
        ]
    }

    #[test]
    fn list_id_has_expected_shape() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let id = generate_list_id(now, &mut rng);
        let suffix = id.strip_prefix("custom-1700000000000-").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn add_sets_name_and_count_from_input() {
        let mut lists = CustomListCollection::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let list = lists.add("Kitchen", "beginner", words(), Utc::now(), &mut rng);
        assert_eq!(list.name, "Kitchen");
        assert_eq!(list.topic, "Kitchen");
        assert_eq!(list.word_count, 2);
        assert_eq!(lists.len(), 1);
    }

    #[test]
    fn remove_also_deactivates() {
        let mut lists = CustomListCollection::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let id = lists
            .add("Kitchen", "beginner", words(), Utc::now(), &mut rng)
            .id
            .clone();
        let mut selection = ListSelectionSettings::default();
        selection.toggle(&id);

        let removed = lists.remove(&id, &mut selection).unwrap();
        assert_eq!(removed.id, id);
        assert!(lists.is_empty());
        assert!(!selection.is_active(&id));
    }

    #[test]
    fn remove_unknown_id_is_an_error() {
        let mut lists = CustomListCollection::default();
        let mut selection = ListSelectionSettings::default();
        let err = lists.remove("custom-nope", &mut selection).unwrap_err();
        assert!(err.to_string().contains("custom-nope"));
    }

    #[test]
    fn created_at_serializes_as_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let mut rng = SmallRng::seed_from_u64(4);
        let list = CustomWordList::new("Zoo", "intermediate", words(), now, &mut rng);
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.contains(r#""createdAt":1700000000123"#));
        assert!(json.contains(r#""wordCount":2"#));
    }
}
