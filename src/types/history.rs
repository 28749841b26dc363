use serde::{Deserialize, Serialize};

/// Placeholder title shown until the real title has been resolved.
pub const LOADING_TITLE: &str = "Loading...";

/// A watched video: its watch/shorts URL and a display title.
///
/// The URL is the unique key within a history. This is also the element
/// type of saved playlist files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VideoRecord {
    pub url: String,
    pub title: String,
}

impl VideoRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Immutable view of the history handed to readers and observers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub items: Vec<VideoRecord>,
    pub current_index: Option<usize>,
}

impl HistorySnapshot {
    /// The record under the cursor, if any.
    pub fn current(&self) -> Option<&VideoRecord> {
        self.current_index.and_then(|i| self.items.get(i))
    }
}

/// On-disk shape of the history: `history` plus an explicit, nullable
/// `currentIndex`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    pub history: Vec<VideoRecord>,
    pub current_index: Option<usize>,
}
