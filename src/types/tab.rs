use serde::{Deserialize, Serialize};

/// A browser tab showing a video page, as reported by a tab observer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserTab {
    pub url: String,
    pub title: String,
}

impl BrowserTab {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}
