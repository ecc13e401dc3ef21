use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use super::types::{InputConfig, InputField, InputModel};

/// Fixed key the calculator inputs are stored under.
pub const STORAGE_KEY: &str = "homeown-calc.deposit-inputs";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize stored record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage local to one client.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Reads the stored inputs. Fields that are not numbers fall back to their
/// defaults; a record that is not a JSON object is cleared. Never fails.
pub fn load_inputs<S: KeyValueStore>(store: &mut S, config: &InputConfig) -> Option<InputModel> {
    let raw = match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("could not read stored inputs: {e}");
            return None;
        }
    };

    match parse_record(&raw, config) {
        Some(inputs) => {
            debug!("resumed stored inputs: {inputs:?}");
            Some(inputs)
        }
        None => {
            warn!("discarding unreadable stored inputs");
            clear_inputs(store);
            None
        }
    }
}

pub fn save_inputs<S: KeyValueStore>(store: &mut S, inputs: &InputModel) {
    let result = serde_json::to_string(inputs)
        .map_err(StoreError::from)
        .and_then(|json| store.set(STORAGE_KEY, &json));
    if let Err(e) = result {
        warn!("could not save inputs: {e}");
    }
}

pub fn clear_inputs<S: KeyValueStore>(store: &mut S) {
    if let Err(e) = store.remove(STORAGE_KEY) {
        warn!("could not clear stored inputs: {e}");
    }
}

fn parse_record(raw: &str, config: &InputConfig) -> Option<InputModel> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let record = value.as_object()?;

    let mut inputs = config.defaults();
    for field in InputField::ALL {
        match record.get(field.key()).and_then(Value::as_f64) {
            Some(number) => inputs.set(field, number),
            None => debug!("stored {} missing or not a number", field.key()),
        }
    }
    Some(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sample_inputs() -> InputModel {
        InputModel {
            gross_annual_income: 72_000.0,
            target_property_price: 315_000.0,
            current_savings: 18_500.0,
            monthly_savings: 1_250.0,
            property_growth_rate: 4.5,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("homeown-{name}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn save_then_load_round_trips_all_fields() {
        let config = InputConfig::default();
        let mut store = MemoryStore::new();
        save_inputs(&mut store, &sample_inputs());

        let loaded = load_inputs(&mut store, &config).expect("stored record");
        assert_eq!(loaded, sample_inputs());
    }

    #[test]
    fn missing_record_loads_nothing() {
        let mut store = MemoryStore::new();
        assert_eq!(load_inputs(&mut store, &InputConfig::default()), None);
    }

    #[test]
    fn non_json_payload_is_cleared() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "not json {").expect("memory set");

        assert_eq!(load_inputs(&mut store, &InputConfig::default()), None);
        assert_eq!(store.get(STORAGE_KEY).expect("memory get"), None);
    }

    #[test]
    fn non_object_json_is_cleared() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "[1, 2, 3]").expect("memory set");

        assert_eq!(load_inputs(&mut store, &InputConfig::default()), None);
        assert_eq!(store.get(STORAGE_KEY).expect("memory get"), None);
    }

    #[test]
    fn mistyped_fields_fall_back_to_defaults() {
        let config = InputConfig::default();
        let mut store = MemoryStore::new();
        store
            .set(
                STORAGE_KEY,
                r#"{"grossAnnualIncome":"lots","targetPropertyPrice":300000,"monthlySavings":null,"propertyGrowthRate":7.5}"#,
            )
            .expect("memory set");

        let loaded = load_inputs(&mut store, &config).expect("partial record");
        let defaults = config.defaults();
        assert_eq!(loaded.gross_annual_income, defaults.gross_annual_income);
        assert_eq!(loaded.target_property_price, 300_000.0);
        assert_eq!(loaded.current_savings, defaults.current_savings);
        assert_eq!(loaded.monthly_savings, defaults.monthly_savings);
        assert_eq!(loaded.property_growth_rate, 7.5);
        assert!(store.get(STORAGE_KEY).expect("memory get").is_some());
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = scratch_dir("file-store");
        let mut store = FileStore::new(&dir);
        save_inputs(&mut store, &sample_inputs());
        assert!(dir.join(format!("{STORAGE_KEY}.json")).exists());

        let mut fresh = FileStore::new(&dir);
        let loaded = load_inputs(&mut fresh, &InputConfig::default()).expect("stored record");
        assert_eq!(loaded, sample_inputs());

        clear_inputs(&mut fresh);
        assert_eq!(fresh.get(STORAGE_KEY).expect("file get"), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn storage_key_is_fixed_and_file_safe() {
        assert_eq!(STORAGE_KEY, "homeown-calc.deposit-inputs");
        let store = FileStore::new(scratch_dir("key"));
        let path = store.path_for(STORAGE_KEY).expect("storage key is accepted");
        assert!(path.ends_with("homeown-calc.deposit-inputs.json"));
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let store = FileStore::new(scratch_dir("keys"));
        let err = store.get("../escape").expect_err("must reject traversal");
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
