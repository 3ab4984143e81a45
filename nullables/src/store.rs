//! Nullable store — thread-safe in-memory key-value storage for testing.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use asty_registration::{KeyValueStore, StoreError};

/// An in-memory [`KeyValueStore`] that can also be told to fail.
pub struct NullStore {
    entries: Mutex<HashMap<String, String>>,
    failing: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
        }
    }

    /// Pre-populate a key.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        self
    }

    /// Make every operation fail with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Raw stored value, bypassing the failure switch.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "storage unavailable")));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for NullStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
