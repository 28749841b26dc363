//! Browser tab observation.
//!
//! `BrowserTabObserver` is the seam to the browser. `ReportedTabs` is the
//! implementation used by the RPC server: the host process pushes the tab
//! state it sees with `tabs.report`, and resume requests go back to the host
//! as `browser.resume` events.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::services::host_events::HostEvents;
use crate::services::url_matcher::is_watch_url;
use crate::types::errors::ObserverError;
use crate::types::tab::BrowserTab;

/// Reads tab state from a browser.
#[async_trait]
pub trait BrowserTabObserver: Send + Sync {
    /// Open tabs showing a watch or shorts page.
    async fn list_video_tabs(&self) -> Result<Vec<BrowserTab>, ObserverError>;
    /// The active tab of the front window.
    async fn active_tab(&self) -> Result<BrowserTab, ObserverError>;
    /// Whether the video element in the tab with `url` is paused; `None` when
    /// it cannot be determined.
    async fn is_video_paused(&self, url: &str) -> Result<Option<bool>, ObserverError>;
    async fn resume_playback(&self, url: &str) -> Result<(), ObserverError>;
}

#[derive(Default)]
struct ReportedState {
    browser_running: bool,
    tabs: Vec<BrowserTab>,
    active: Option<BrowserTab>,
    paused: HashSet<String>,
}

/// Tab state last reported by the host.
pub struct ReportedTabs {
    state: Mutex<ReportedState>,
    events: Option<HostEvents>,
}

impl ReportedTabs {
    pub fn new(events: Option<HostEvents>) -> Self {
        Self {
            state: Mutex::new(ReportedState::default()),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, ReportedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the reported state wholesale.
    pub fn report(
        &self,
        tabs: Vec<BrowserTab>,
        active: Option<BrowserTab>,
        paused: impl IntoIterator<Item = String>,
    ) {
        let mut state = self.state();
        state.browser_running = true;
        state.tabs = tabs;
        state.active = active;
        state.paused = paused.into_iter().collect();
        debug!(tabs = state.tabs.len(), "tab state reported");
    }

    /// Marks the browser as gone; subsequent reads fail until the next report.
    pub fn report_browser_closed(&self) {
        *self.state() = ReportedState::default();
    }
}

#[async_trait]
impl BrowserTabObserver for ReportedTabs {
    async fn list_video_tabs(&self) -> Result<Vec<BrowserTab>, ObserverError> {
        let state = self.state();
        if !state.browser_running {
            return Err(ObserverError::BrowserNotRunning);
        }
        Ok(state
            .tabs
            .iter()
            .filter(|t| is_watch_url(&t.url))
            .cloned()
            .collect())
    }

    async fn active_tab(&self) -> Result<BrowserTab, ObserverError> {
        let state = self.state();
        if !state.browser_running {
            return Err(ObserverError::BrowserNotRunning);
        }
        state.active.clone().ok_or(ObserverError::NoActiveTab)
    }

    async fn is_video_paused(&self, url: &str) -> Result<Option<bool>, ObserverError> {
        let state = self.state();
        if !state.browser_running {
            return Err(ObserverError::BrowserNotRunning);
        }
        let known = state.tabs.iter().any(|t| t.url == url)
            || state.active.as_ref().is_some_and(|t| t.url == url);
        Ok(known.then(|| state.paused.contains(url)))
    }

    async fn resume_playback(&self, url: &str) -> Result<(), ObserverError> {
        {
            let mut state = self.state();
            if !state.browser_running {
                return Err(ObserverError::BrowserNotRunning);
            }
            let known = state.tabs.iter().any(|t| t.url == url)
                || state.active.as_ref().is_some_and(|t| t.url == url);
            if !known {
                return Err(ObserverError::ScriptFailed(format!("no tab shows {}", url)));
            }
            state.paused.remove(url);
        }
        if let Some(events) = &self.events {
            events.emit("browser.resume", json!({ "url": url }));
        }
        Ok(())
    }
}
