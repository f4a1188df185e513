//! Best-effort key-value persistence
//!
//! Front ends supply a [`Storage`] backend (a JSON file, `localStorage`, ...).
//! Reads and writes go through [`load_record`] and [`save_record`], which
//! never fail: a broken backend only costs the saved data, never gameplay.

use crate::error::StorageError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Key for [`crate::records::Stats`]
pub const STATS_KEY: &str = "np_stats_v1";
/// Key for [`crate::records::SessionRecord`]
pub const SESSION_KEY: &str = "np_session_v1";
/// Key for [`crate::records::Preferences`]
pub const PREFERENCES_KEY: &str = "zehner_prefs_v1";

/// A string key-value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a record; `None` if missing or unreadable
pub fn load_record<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Ignoring unreadable record {key}: {e}");
            None
        }
    }
}

/// Encode and store a record, logging and dropping any failure
pub fn save_record<T: Serialize>(storage: &mut dyn Storage, key: &str, record: &T) {
    let result = serde_json::to_string(record)
        .map_err(StorageError::from)
        .and_then(|json| storage.set(key, &json));
    if let Err(e) = result {
        warn!("Could not save {key}: {e}");
    }
}

/// Delete a record, logging and dropping any failure
pub fn remove_record(storage: &mut dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        warn!("Could not remove {key}: {e}");
    }
}

/// In-memory storage for tests and for front ends without persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Stats;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Option<String> {
            Some("{not json".to_string())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let stats = Stats {
            solved: 4,
            first_try: 2,
        };
        save_record(&mut storage, STATS_KEY, &stats);
        assert_eq!(
            storage.get(STATS_KEY).as_deref(),
            Some(r#"{"solved":4,"firstTry":2}"#)
        );
        assert_eq!(load_record::<Stats>(&storage, STATS_KEY), Some(stats));

        remove_record(&mut storage, STATS_KEY);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_missing_record() {
        let storage = MemoryStorage::new();
        assert_eq!(load_record::<Stats>(&storage, STATS_KEY), None);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut storage = BrokenStorage;
        save_record(&mut storage, STATS_KEY, &Stats::default());
        remove_record(&mut storage, STATS_KEY);
        assert_eq!(load_record::<Stats>(&storage, STATS_KEY), None);
    }
}
