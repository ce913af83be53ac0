use rust_embed::Embed;

use crate::catalog::{VocabularyWord, dedupe_words};

#[derive(Embed)]
#[folder = "assets/catalog/"]
struct CatalogAssets;

const BUILT_IN_FILE: &str = "words-de.json";

/// The "Common Words" list shipped with the binary, duplicate-filtered.
pub fn built_in_words() -> Vec<VocabularyWord> {
    let Some(file) = CatalogAssets::get(BUILT_IN_FILE) else {
        tracing::warn!("built-in catalog asset {BUILT_IN_FILE} is missing");
        return Vec::new();
    };
    match serde_json::from_slice::<Vec<VocabularyWord>>(&file.data) {
        Ok(words) => dedupe_words(words),
        Err(e) => {
            tracing::warn!("built-in catalog is malformed: {e}");
            Vec::new()
        }
    }
}
