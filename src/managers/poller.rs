//! Browser polling loop.
//!
//! Every tick pulls open video tabs into the history and switches playback
//! to the browser's active video tab when it changes.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{self, lock_app, SharedApp};
use crate::managers::history_manager::HistoryManagerTrait;
use crate::managers::playback_session::PlaybackOutcome;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::tab_observer::BrowserTabObserver;
use crate::services::url_matcher::is_watch_url;

/// What one tick did.
#[derive(Debug, Default)]
pub struct PollReport {
    /// URLs newly added to the history, in tab order.
    pub added: Vec<String>,
    /// Active tab URL that playback switched to.
    pub started: Option<String>,
    pub playback: Option<JoinHandle<PlaybackOutcome>>,
}

/// Runs one poll tick. Observer failures are logged and treated as "no tabs"
/// or "no active tab" for this tick.
pub async fn poll_once(app: &SharedApp, observer: &dyn BrowserTabObserver) -> PollReport {
    let mut report = PollReport::default();

    if !lock_app(app).settings.app_settings().detection_enabled {
        return report;
    }

    let tabs = match observer.list_video_tabs().await {
        Ok(tabs) => tabs,
        Err(e) => {
            debug!("listing video tabs failed: {}", e);
            Vec::new()
        }
    };
    for tab in tabs {
        if lock_app(app).history.contains_url(&tab.url) {
            continue;
        }
        app::add_or_bump(app, &tab.url, &tab.title);
        report.added.push(tab.url);
    }

    let active = match observer.active_tab().await {
        Ok(active) => active,
        Err(e) => {
            debug!("reading active tab failed: {}", e);
            return report;
        }
    };
    if !is_watch_url(&active.url) {
        return report;
    }
    // A failed attempt does not count, so the tab is retried next tick
    let current = lock_app(app).playback.active_url().map(str::to_string);
    if current.as_deref() == Some(active.url.as_str()) {
        return report;
    }

    match observer.is_video_paused(&active.url).await {
        Ok(Some(true)) => {
            if let Err(e) = observer.resume_playback(&active.url).await {
                warn!(url = %active.url, "resuming browser playback failed: {}", e);
            }
        }
        Ok(_) => {}
        Err(e) => debug!(url = %active.url, "paused state unavailable: {}", e),
    }

    info!(url = %active.url, "active tab changed, switching playback");
    {
        let mut a = lock_app(app);
        if let Some(index) = a.history.position_of(&active.url) {
            if let Err(e) = a.history.select(index) {
                warn!(url = %active.url, "selecting active tab failed: {}", e);
            }
        }
    }
    report.playback = app::start_playback(app, &active.url);
    report.started = Some(active.url);
    report
}

/// Polls until `shutdown` flips to `true`. The interval is re-read from
/// settings every tick.
pub async fn run_poll_loop(
    app: SharedApp,
    observer: std::sync::Arc<dyn BrowserTabObserver>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let secs = lock_app(&app).settings.app_settings().poll_interval_secs;
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }
        poll_once(&app, observer.as_ref()).await;
    }
    debug!("poll loop stopped");
}
