use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::store::KeyValueStore;

/// One JSON file per key under a data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    /// Remove `.tmp` files left behind by an interrupted write.
    /// Returns true if any were found.
    pub fn clean_interrupted_writes(&self) -> bool {
        let Ok(entries) = fs::read_dir(&self.base_dir) else {
            return false;
        };
        let mut found = false;
        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            if path.extension().and_then(|x| x.to_str()) == Some("tmp") {
                found = true;
                let _ = fs::remove_file(&path);
            }
        }
        found
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artikel-meister")
}

impl KeyValueStore for JsonStore {
    fn load(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("failed to read {key}: {e}");
                None
            }
        }
    }

    /// Write to a temporary file and rename over the target so a crash never
    /// leaves a half-written record.
    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.file_path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, mut store) = make_test_store();
        store.save("artikel-meister-settings", r#"{"a":1}"#).unwrap();
        assert_eq!(
            store.load("artikel-meister-settings").as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(store.file_path("artikel-meister-settings").exists());
    }

    #[test]
    fn missing_key_loads_none() {
        let (_dir, store) = make_test_store();
        assert!(store.load("nothing-here").is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, mut store) = make_test_store();
        store.save("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.load("k").is_none());
    }

    #[test]
    fn save_leaves_no_tmp_files() {
        let (dir, mut store) = make_test_store();
        store.save("k", "v").unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn interrupted_writes_are_cleaned() {
        let (_dir, store) = make_test_store();
        assert!(!store.clean_interrupted_writes());
        fs::write(store.base_dir().join("k.json.tmp"), "{").unwrap();
        assert!(store.clean_interrupted_writes());
        assert!(!store.base_dir().join("k.json.tmp").exists());
    }

    #[test]
    fn save_fails_when_directory_is_gone() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore {
            base_dir: dir.path().join("nonexistent_subdir"),
        };
        assert!(store.save("k", "v").is_err());
    }
}
