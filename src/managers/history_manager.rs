//! History Manager for YouTubeMini.
//!
//! Implements `HistoryManagerTrait`: an ordered, de-duplicated list of at most
//! [`MAX_HISTORY`] watched videos plus a nullable "currently playing" cursor.
//! Every mutation recomputes the cursor synchronously, persists the new state
//! and notifies subscribed observers.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::errors::{HistoryError, SettingsError};
use crate::types::history::{HistorySnapshot, PersistedHistory, VideoRecord};
use crate::types::settings::keys;

/// Maximum number of records kept; the oldest is evicted first.
pub const MAX_HISTORY: usize = 20;

/// Receives a snapshot after every history mutation.
pub trait HistoryObserver: Send {
    fn history_changed(&self, snapshot: &HistorySnapshot);
}

/// Destination for the persisted `(history, currentIndex)` pair.
pub trait HistoryPersistence: Send + Sync {
    fn persist(&self, state: &PersistedHistory) -> Result<(), SettingsError>;
}

/// What happens to the cursor when the item under it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// The cursor becomes `None`.
    #[default]
    ClearCursor,
    /// The cursor stays on the slot, now holding the next item (clamped to the
    /// last index; `None` once the list is empty).
    KeepSlot,
}

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn add_or_bump(&mut self, url: &str, title: &str) -> usize;
    fn remove(&mut self, index: usize) -> Result<(), HistoryError>;
    fn select(&mut self, index: usize) -> Result<(), HistoryError>;
    fn advance_to_next(&mut self) -> Option<VideoRecord>;
    fn replace_all(&mut self, items: Vec<VideoRecord>);
    fn update_title(&mut self, url: &str, title: &str) -> bool;
    fn clear(&mut self);
    fn snapshot(&self) -> HistorySnapshot;
    fn items(&self) -> &[VideoRecord];
    fn current_index(&self) -> Option<usize>;
    fn current(&self) -> Option<&VideoRecord>;
    fn position_of(&self, url: &str) -> Option<usize>;
    fn contains_url(&self, url: &str) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}

/// In-memory history with optional write-through persistence.
pub struct HistoryManager {
    items: Vec<VideoRecord>,
    current_index: Option<usize>,
    removal_policy: RemovalPolicy,
    persistence: Option<Arc<dyn HistoryPersistence>>,
    observers: Vec<Box<dyn HistoryObserver>>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            current_index: None,
            removal_policy: RemovalPolicy::default(),
            persistence: None,
            observers: Vec::new(),
        }
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Writes every subsequent mutation through to `persistence`.
    pub fn attach_persistence(&mut self, persistence: Arc<dyn HistoryPersistence>) {
        self.persistence = Some(persistence);
    }

    pub fn subscribe(&mut self, observer: Box<dyn HistoryObserver>) {
        self.observers.push(observer);
    }

    /// Persists the current state immediately (used on shutdown).
    pub fn persist_now(&self) -> Result<(), SettingsError> {
        match &self.persistence {
            Some(persistence) => persistence.persist(&self.to_persisted()),
            None => Ok(()),
        }
    }

    pub fn to_persisted(&self) -> PersistedHistory {
        PersistedHistory {
            history: self.items.clone(),
            current_index: self.current_index,
        }
    }

    /// Serializes to `{"history": [...], "currentIndex": n | null}`.
    pub fn serialize(&self) -> Result<String, SettingsError> {
        serde_json::to_string(&self.to_persisted())
            .map_err(|e| SettingsError::SerializationError(e.to_string()))
    }

    /// Rebuilds a history from a blob produced by [`HistoryManager::serialize`].
    ///
    /// Never fails: a malformed blob or `history` field yields an empty list,
    /// and a malformed or out-of-range `currentIndex` yields `None`.
    pub fn deserialize(blob: &str) -> Self {
        match serde_json::from_str::<Value>(blob) {
            Ok(Value::Object(map)) => {
                Self::from_values(map.get(keys::HISTORY), map.get(keys::CURRENT_INDEX))
            }
            Ok(_) => {
                warn!("history blob is not a JSON object, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!("history blob is malformed, starting empty: {}", e);
                Self::new()
            }
        }
    }

    /// Rebuilds a history from the two stored settings values, validating each
    /// on its own.
    pub fn from_values(history: Option<&Value>, current_index: Option<&Value>) -> Self {
        let mut manager = Self::new();

        manager.items = match history {
            None => Vec::new(),
            Some(value) => match serde_json::from_value::<Vec<VideoRecord>>(value.clone()) {
                Ok(items) => items,
                Err(e) => {
                    warn!("{}", SettingsError::PersistenceReadInvalid(format!("history: {}", e)));
                    Vec::new()
                }
            },
        };

        manager.current_index = match current_index {
            None => None,
            Some(value) => match serde_json::from_value::<Option<usize>>(value.clone()) {
                Ok(Some(index)) if index < manager.items.len() => Some(index),
                Ok(Some(index)) => {
                    warn!(
                        index,
                        len = manager.items.len(),
                        "stored currentIndex out of range, clearing cursor"
                    );
                    None
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(
                        "{}",
                        SettingsError::PersistenceReadInvalid(format!("currentIndex: {}", e))
                    );
                    None
                }
            },
        };

        manager.evict_overflow();
        manager
    }

    fn check_index(&self, index: usize) -> Result<(), HistoryError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(HistoryError::OutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Removes `items[index]` and shifts the cursor to keep it pointing at the
    /// same record, or applies the removal policy when that record is gone.
    fn remove_at(&mut self, index: usize) -> VideoRecord {
        let removed = self.items.remove(index);
        if let Some(cursor) = self.current_index {
            self.current_index = match index.cmp(&cursor) {
                Ordering::Less => Some(cursor - 1),
                Ordering::Greater => Some(cursor),
                Ordering::Equal => match self.removal_policy {
                    RemovalPolicy::ClearCursor => None,
                    RemovalPolicy::KeepSlot if self.items.is_empty() => None,
                    RemovalPolicy::KeepSlot => Some(cursor.min(self.items.len() - 1)),
                },
            };
        }
        removed
    }

    fn evict_overflow(&mut self) {
        while self.items.len() > MAX_HISTORY {
            let evicted = self.remove_at(0);
            debug!(url = %evicted.url, "evicted oldest history entry");
        }
    }

    /// Persists and notifies. Persistence failures are logged, never returned.
    fn commit(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.persist(&self.to_persisted()) {
                warn!("failed to persist history: {}", e);
            }
        }
        if !self.observers.is_empty() {
            let snapshot = self.snapshot();
            for observer in &self.observers {
                observer.history_changed(&snapshot);
            }
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManagerTrait for HistoryManager {
    /// Moves `url` to the end (inserting it if new) with the given title and
    /// returns its final index. The first record added to an empty history
    /// becomes the current one.
    fn add_or_bump(&mut self, url: &str, title: &str) -> usize {
        let was_empty = self.items.is_empty() && self.current_index.is_none();

        if let Some(existing) = self.position_of(url) {
            self.remove_at(existing);
        }
        self.items.push(VideoRecord::new(url, title));
        self.evict_overflow();

        if was_empty {
            self.current_index = Some(0);
        }

        let index = self.items.len() - 1;
        debug!(url, index, "history add_or_bump");
        self.commit();
        index
    }

    fn remove(&mut self, index: usize) -> Result<(), HistoryError> {
        self.check_index(index)?;
        let removed = self.remove_at(index);
        debug!(url = %removed.url, index, cursor = ?self.current_index, "history remove");
        self.commit();
        Ok(())
    }

    fn select(&mut self, index: usize) -> Result<(), HistoryError> {
        self.check_index(index)?;
        self.current_index = Some(index);
        self.commit();
        Ok(())
    }

    /// Moves the cursor forward one slot. Returns `None` without touching any
    /// state when nothing is selected or the cursor is on the last record.
    fn advance_to_next(&mut self) -> Option<VideoRecord> {
        let next = self.current_index? + 1;
        if next >= self.items.len() {
            return None;
        }
        self.current_index = Some(next);
        self.commit();
        Some(self.items[next].clone())
    }

    /// Playlist load. Items are taken as given (duplicates pass through); only
    /// the last [`MAX_HISTORY`] are kept.
    fn replace_all(&mut self, mut items: Vec<VideoRecord>) {
        if items.len() > MAX_HISTORY {
            items.drain(..items.len() - MAX_HISTORY);
        }
        self.current_index = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        self.commit();
    }

    /// Replaces the title of the record with `url` in place. Returns whether a
    /// record changed.
    fn update_title(&mut self, url: &str, title: &str) -> bool {
        let Some(record) = self.items.iter_mut().find(|r| r.url == url) else {
            return false;
        };
        if record.title == title {
            return false;
        }
        record.title = title.to_string();
        self.commit();
        true
    }

    fn clear(&mut self) {
        self.items.clear();
        self.current_index = None;
        self.commit();
    }

    fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            items: self.items.clone(),
            current_index: self.current_index,
        }
    }

    fn items(&self) -> &[VideoRecord] {
        &self.items
    }

    fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    fn current(&self) -> Option<&VideoRecord> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    fn position_of(&self, url: &str) -> Option<usize> {
        self.items.iter().position(|r| r.url == url)
    }

    fn contains_url(&self, url: &str) -> bool {
        self.position_of(url).is_some()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
