//! Local settings persistence
//!
//! Settings live in a flat JSON key-value file. Read and write faults are
//! logged and swallowed: readers get empty strings, writers get `false`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use serde_json::{Map, Value};

use crate::models::Settings;

/// Keys stored in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKey {
    ApiKey,
    ApiProviderUrl,
    ModelName,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 3] = [
        SettingsKey::ApiKey,
        SettingsKey::ApiProviderUrl,
        SettingsKey::ModelName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsKey::ApiKey => "apiKey",
            SettingsKey::ApiProviderUrl => "apiProvider",
            SettingsKey::ModelName => "modelName",
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    current: Mutex<Settings>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(Settings::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored value, or an empty string when absent or unreadable
    pub fn get(&self, key: SettingsKey) -> String {
        match read_entries(&self.path) {
            Ok(entries) => entry_as_string(&entries, key),
            Err(e) => {
                warn!("[settings] {}", e);
                String::new()
            }
        }
    }

    /// Stores a single value; returns whether the write was acknowledged
    ///
    /// The in-memory copy takes the value even when the write fails.
    pub fn set(&self, key: SettingsKey, value: &str) -> bool {
        *field_mut(&mut self.lock_current(), key) = value.to_string();
        match self.update(|entries| {
            entries.insert(key.as_str().to_string(), Value::String(value.to_string()));
        }) {
            Ok(()) => true,
            Err(e) => {
                warn!("[settings] {}", e);
                false
            }
        }
    }

    /// Reads all fields from disk and refreshes the in-memory copy
    pub fn load(&self) -> Settings {
        let settings = Settings {
            api_key: self.get(SettingsKey::ApiKey),
            api_provider_url: self.get(SettingsKey::ApiProviderUrl),
            model_name: self.get(SettingsKey::ModelName),
        };
        *self.lock_current() = settings.clone();
        settings
    }

    /// Writes every field; acknowledged only if all writes succeed
    pub fn save(&self, settings: &Settings) -> bool {
        let saved = SettingsKey::ALL
            .into_iter()
            .fold(true, |saved, key| self.set(key, field(settings, key)) && saved);
        if saved {
            info!("[settings] saved to {:?}", self.path);
        }
        saved
    }

    /// Settings as of the last load, set or save
    pub fn current(&self) -> Settings {
        self.lock_current().clone()
    }

    fn lock_current(&self) -> MutexGuard<'_, Settings> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> Result<(), String> {
        // A corrupt file is replaced rather than blocking every future save.
        let mut entries = read_entries(&self.path).unwrap_or_default();
        apply(&mut entries);
        write_entries(&self.path, &entries)
    }
}

fn field(settings: &Settings, key: SettingsKey) -> &str {
    match key {
        SettingsKey::ApiKey => &settings.api_key,
        SettingsKey::ApiProviderUrl => &settings.api_provider_url,
        SettingsKey::ModelName => &settings.model_name,
    }
}

fn field_mut(settings: &mut Settings, key: SettingsKey) -> &mut String {
    match key {
        SettingsKey::ApiKey => &mut settings.api_key,
        SettingsKey::ApiProviderUrl => &mut settings.api_provider_url,
        SettingsKey::ModelName => &mut settings.model_name,
    }
}

fn entry_as_string(entries: &Map<String, Value>, key: SettingsKey) -> String {
    entries
        .get(key.as_str())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn read_entries(path: &Path) -> Result<Map<String, Value>, String> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings: {}", e))?;
    match serde_json::from_str::<Value>(&content)
        .map_err(|e| format!("Failed to parse settings: {}", e))?
    {
        Value::Object(entries) => Ok(entries),
        _ => Err("Failed to parse settings: not a JSON object".to_string()),
    }
}

fn write_entries(path: &Path, entries: &Map<String, Value>) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory: {}", e))?;
    }
    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to save settings: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("nested").join("config.json"))
    }

    fn sample() -> Settings {
        Settings {
            api_key: "sk-test".into(),
            api_provider_url: "https://openrouter.ai/api/v1/chat/completions".into(),
            model_name: "openai/gpt-4o-mini".into(),
        }
    }

    #[test]
    fn unset_fields_read_back_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get(SettingsKey::ApiKey), "");
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.save(&sample()));

        let reopened = store_in(&dir);
        assert_eq!(reopened.load(), sample());
        assert_eq!(reopened.current(), sample());
    }

    #[test]
    fn set_updates_single_key_and_current_copy() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.save(&sample()));
        assert!(store.set(SettingsKey::ModelName, "mistral/small"));

        assert_eq!(store.get(SettingsKey::ModelName), "mistral/small");
        assert_eq!(store.get(SettingsKey::ApiKey), "sk-test");
        assert_eq!(store.current().model_name, "mistral/small");
    }

    #[test]
    fn unrelated_keys_survive_a_save() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"theme":"dark","apiKey":"old"}"#).unwrap();

        assert!(store.save(&sample()));
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["apiKey"], "sk-test");
    }

    #[test]
    fn corrupt_file_reads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load(), Settings::default());
        assert_eq!(store.get(SettingsKey::ApiProviderUrl), "");
        assert!(store.set(SettingsKey::ApiKey, "fresh"));
        assert_eq!(store.get(SettingsKey::ApiKey), "fresh");
    }

    #[test]
    fn non_string_values_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"apiKey":42,"modelName":"m"}"#).unwrap();

        let settings = store.load();
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.model_name, "m");
    }

    #[test]
    fn failed_write_is_not_acknowledged() {
        let dir = TempDir::new().unwrap();
        // The parent "directory" is a regular file, so the write must fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = SettingsStore::new(blocker.join("config.json"));

        assert!(!store.save(&sample()));
        assert_eq!(store.current(), sample());
        assert_eq!(store.get(SettingsKey::ApiKey), "");
    }

    #[test]
    fn failed_single_write_still_updates_session_copy() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = SettingsStore::new(blocker.join("config.json"));

        assert!(!store.set(SettingsKey::ApiKey, "sk-session"));
        assert!(store.current().has_api_key());
        assert_eq!(store.current().model_name, "");
    }
}
