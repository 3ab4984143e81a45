//! Key-value persistence port for the form draft.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use asty_types::RegistrationFormData;

use crate::StoreError;

/// Key under which the referral draft is stored.
pub const DRAFT_KEY: &str = "asty.registration.referral";

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

/// Restore the saved form draft, if any.
pub fn load_draft(store: &dyn KeyValueStore) -> Result<Option<RegistrationFormData>, StoreError> {
    store
        .get(DRAFT_KEY)?
        .map(|raw| serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string())))
        .transpose()
}

/// Save the form draft; an empty draft clears the key.
pub fn save_draft(store: &dyn KeyValueStore, form: &RegistrationFormData) -> Result<(), StoreError> {
    if form.referral_address.is_empty() {
        return store.clear(DRAFT_KEY);
    }
    let raw = serde_json::to_string(form).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(DRAFT_KEY, &raw)
}

/// A JSON file holding every key. The whole file is rewritten on each change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = entries.clone();
        f(&mut next);
        let raw = serde_json::to_string_pretty(&next).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("k", "v").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.clear("k").unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("k").unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("sub");
        let store = FileStore::open(blocker.join("state.json")).unwrap();
        std::fs::write(&blocker, "a file where the directory should be").unwrap();

        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn draft_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(load_draft(&store).unwrap(), None);

        let form = RegistrationFormData {
            referral_address: "0xabc".into(),
        };
        save_draft(&store, &form).unwrap();
        assert_eq!(load_draft(&store).unwrap(), Some(form));

        save_draft(&store, &RegistrationFormData::default()).unwrap();
        assert_eq!(load_draft(&store).unwrap(), None);
    }
}
