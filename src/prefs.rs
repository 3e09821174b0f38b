use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use log::debug;

use crate::observable::{Observable, Observer};
use crate::storage::{FileStorage, MemoryStorage, StorageError};

pub const PREFERENCES_FILE: &str = "preferences.json";

/// Integer key-value preferences persisted as one JSON object.
///
/// Every committed change is written through to the backing [`FileStorage`]
/// before it becomes visible; a failed write leaves the previous value in
/// place.
pub struct PreferenceStore {
    storage: Box<dyn FileStorage>,
    values: Mutex<BTreeMap<String, i64>>,
    watchers: Mutex<HashMap<String, Observable<Option<i64>>>>,
}

impl PreferenceStore {
    pub fn open(storage: Box<dyn FileStorage>) -> Result<Self, StorageError> {
        let values = match storage.load(PREFERENCES_FILE)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt(format!("{PREFERENCES_FILE}: {e}")))?,
            None => BTreeMap::new(),
        };
        debug!("opened preference store with {} keys", values.len());

        Ok(Self {
            storage,
            values: Mutex::new(values),
            watchers: Mutex::new(HashMap::new()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            values: Mutex::new(BTreeMap::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).copied())
    }

    /// Atomically replaces the value under `key` with `f(current)`.
    ///
    /// Returning `None` from `f` removes the key. Returns the value stored
    /// after the update.
    pub fn update<F>(&self, key: &str, f: F) -> Result<Option<i64>, StorageError>
    where
        F: FnOnce(Option<i64>) -> Option<i64>,
    {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let current = values.get(key).copied();
        let next = f(current);
        if next == current {
            return Ok(current);
        }

        set_entry(&mut values, key, next);
        if let Err(e) = self.persist(&values) {
            set_entry(&mut values, key, current);
            return Err(e);
        }

        self.publish(key, next)?;
        Ok(next)
    }

    pub fn set(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.update(key, |_| Some(value)).map(|_| ())
    }

    /// Observes the value under `key`; `None` while unset.
    pub fn watch(&self, key: &str) -> Result<Observer<Option<i64>>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let mut watchers = self.watchers.lock().map_err(|_| StorageError::Poisoned)?;
        let observer = watchers
            .entry(key.to_string())
            .or_insert_with(|| Observable::new(values.get(key).copied()))
            .subscribe();
        Ok(observer)
    }

    fn persist(&self, values: &BTreeMap<String, i64>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|e| StorageError::Corrupt(format!("encode {PREFERENCES_FILE}: {e}")))?;
        self.storage.save(PREFERENCES_FILE, &bytes)
    }

    fn publish(&self, key: &str, value: Option<i64>) -> Result<(), StorageError> {
        let watchers = self.watchers.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(watcher) = watchers.get(key) {
            watcher.set_if_changed(value);
        }
        Ok(())
    }
}

fn set_entry(values: &mut BTreeMap<String, i64>, key: &str, value: Option<i64>) {
    match value {
        Some(v) => {
            values.insert(key.to_string(), v);
        }
        None => {
            values.remove(key);
        }
    }
}
