// YouTubeMini Settings Engine
// A small key/value store persisted as one JSON object on disk. Holds the
// history, its cursor, window geometry and the presentation/detection flags.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::managers::history_manager::HistoryPersistence;
use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::history::{PersistedHistory, VideoRecord};
use crate::types::settings::{keys, AppSettings, WindowFrame};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&self) -> Result<(), SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn remove_value(&self, key: &str) -> Result<(), SettingsError>;
    fn app_settings(&self) -> AppSettings;
    fn reset(&self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that keeps every key in memory and rewrites the JSON file
/// on each change.
pub struct SettingsEngine {
    config_path: String,
    values: Mutex<Map<String, Value>>,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the settings file.
    /// Otherwise, uses `settings.json` inside the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            values: Mutex::new(Map::new()),
        }
    }

    fn values(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reads `key` as `T`.
    ///
    /// Returns `Ok(None)` when the key is absent and
    /// `SettingsError::PersistenceReadInvalid` when the stored value does not
    /// fit `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        match self.get_value(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                SettingsError::PersistenceReadInvalid(format!("{}: {}", key, e))
            }),
        }
    }

    /// Sets several keys and writes the file once.
    pub fn set_values(&self, entries: Vec<(&str, Value)>) -> Result<(), SettingsError> {
        for (key, value) in &entries {
            Self::validate(key, value)?;
        }
        {
            let mut values = self.values();
            for (key, value) in entries {
                values.insert(key.to_string(), value);
            }
        }
        self.save()
    }

    /// Checks that `value` deserializes into the type stored under `key`.
    fn validate(key: &str, value: &Value) -> Result<(), SettingsError> {
        fn check<T: DeserializeOwned>(key: &str, value: &Value) -> Result<(), SettingsError> {
            serde_json::from_value::<T>(value.clone())
                .map(|_| ())
                .map_err(|e| {
                    SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
                })
        }

        match key {
            keys::HISTORY => check::<Vec<VideoRecord>>(key, value),
            keys::CURRENT_INDEX => check::<Option<usize>>(key, value),
            keys::WINDOW_FRAME => check::<Option<WindowFrame>>(key, value),
            keys::MINI_VIEW_MODE
            | keys::LEFT_PANEL_COLLAPSED
            | keys::DETECTION_ENABLED
            | keys::WAS_PLAYING_ON_QUIT => check::<bool>(key, value),
            keys::POLL_INTERVAL_SECS => match value.as_u64() {
                Some(secs) if secs > 0 => Ok(()),
                _ => Err(SettingsError::InvalidValue(format!(
                    "Invalid value for key '{}': expected a positive integer",
                    key
                ))),
            },
            _ => Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            ))),
        }
    }

    /// Reads one flag, falling back to `default` when absent or malformed.
    fn typed_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_typed(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("{}", e);
                default
            }
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON file.
    ///
    /// A missing file yields an empty store. A file that is not a JSON object
    /// also yields an empty store, reported as `PersistenceReadInvalid` so the
    /// caller can log it and carry on.
    fn load(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.values().clear();
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read settings file: {}", e)))?;

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => {
                debug!(path = %self.config_path, keys = map.len(), "loaded settings");
                *self.values() = map;
                Ok(())
            }
            Ok(_) => {
                self.values().clear();
                Err(SettingsError::PersistenceReadInvalid(
                    "settings file is not a JSON object".to_string(),
                ))
            }
            Err(e) => {
                self.values().clear();
                Err(SettingsError::PersistenceReadInvalid(format!(
                    "Failed to parse settings file: {}",
                    e
                )))
            }
        }
    }

    /// Writes the current settings to disk, creating parent directories.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = {
            let values = self.values();
            serde_json::to_string_pretty(&*values).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
            })?
        };

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write settings file: {}", e)))
    }

    fn get_value(&self, key: &str) -> Option<Value> {
        self.values().get(key).cloned()
    }

    /// Updates one known key after checking the value fits its type, then
    /// saves to disk.
    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        self.set_values(vec![(key, value)])
    }

    fn remove_value(&self, key: &str) -> Result<(), SettingsError> {
        if !keys::ALL.contains(&key) {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
        let removed = self.values().remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(())
    }

    /// Typed view of the flags; malformed entries fall back to defaults.
    fn app_settings(&self) -> AppSettings {
        let defaults = AppSettings::default();
        AppSettings {
            window_frame: self.typed_or(keys::WINDOW_FRAME, defaults.window_frame),
            mini_view_mode: self.typed_or(keys::MINI_VIEW_MODE, defaults.mini_view_mode),
            left_panel_collapsed: self
                .typed_or(keys::LEFT_PANEL_COLLAPSED, defaults.left_panel_collapsed),
            detection_enabled: self.typed_or(keys::DETECTION_ENABLED, defaults.detection_enabled),
            was_playing_on_quit: self
                .typed_or(keys::WAS_PLAYING_ON_QUIT, defaults.was_playing_on_quit),
            poll_interval_secs: match self.typed_or(keys::POLL_INTERVAL_SECS, 0u64) {
                0 => defaults.poll_interval_secs,
                secs => secs,
            },
        }
    }

    /// Clears every key and saves the empty store.
    fn reset(&self) -> Result<(), SettingsError> {
        self.values().clear();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

impl HistoryPersistence for SettingsEngine {
    /// Stores `history` and an explicit `currentIndex` (JSON `null` when no
    /// item is selected) in a single write.
    fn persist(&self, state: &PersistedHistory) -> Result<(), SettingsError> {
        let history = serde_json::to_value(&state.history)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        let current_index = serde_json::to_value(state.current_index)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        self.set_values(vec![
            (keys::HISTORY, history),
            (keys::CURRENT_INDEX, current_index),
        ])
    }
}
