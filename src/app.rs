//! App Core for YouTubeMini.
//!
//! `App` owns the settings engine, the history, the playback session and the
//! stream resolver. It lives behind [`SharedApp`]; the free functions in this
//! module do the async halves of playback and title lookup without holding
//! the lock across an `.await`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait, RemovalPolicy};
use crate::managers::playback_session::{PlaybackOutcome, PlaybackSession, PlaybackToken};
use crate::services::host_events::HostEvents;
use crate::services::media_sink::{HostPlayerSink, MediaPlayerSink};
use crate::services::playlist_io;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::stream_resolver::{CommandStreamResolver, StreamResolver};
use crate::services::url_matcher::validate_watch_url;
use crate::types::errors::{HistoryError, PlaylistError};
use crate::types::history::{VideoRecord, LOADING_TITLE};
use crate::types::settings::keys;

/// Environment variable overriding the settings file path.
pub const CONFIG_ENV: &str = "YOUTUBE_MINI_CONFIG";

/// Central application struct.
pub struct App {
    pub settings: Arc<SettingsEngine>,
    pub history: HistoryManager,
    pub playback: PlaybackSession,
    resolver: Arc<dyn StreamResolver>,
}

impl App {
    /// Loads settings, restores the persisted history and wires history
    /// write-through into the settings store.
    ///
    /// Unreadable settings are logged and the app starts from defaults.
    /// Resuming the video that was playing at the last quit is a separate
    /// step, see [`resume_on_launch`].
    pub fn new(
        settings: Arc<SettingsEngine>,
        resolver: Arc<dyn StreamResolver>,
        sink: Box<dyn MediaPlayerSink>,
        removal_policy: RemovalPolicy,
    ) -> Self {
        if let Err(e) = settings.load() {
            warn!(path = settings.get_config_path(), "{}", e);
        }

        let mut history = HistoryManager::from_values(
            settings.get_value(keys::HISTORY).as_ref(),
            settings.get_value(keys::CURRENT_INDEX).as_ref(),
        )
        .with_removal_policy(removal_policy);
        history.attach_persistence(settings.clone());

        info!(
            items = history.len(),
            cursor = ?history.current_index(),
            "history restored"
        );

        Self {
            settings,
            history,
            playback: PlaybackSession::new(sink),
            resolver,
        }
    }

    /// App wired for the RPC host: settings from `$YOUTUBE_MINI_CONFIG` (or the
    /// platform config dir), the command-line extractor, and a player sink
    /// and history observer that forward to `events`.
    pub fn from_env(events: HostEvents) -> Self {
        let path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty());
        let settings = Arc::new(SettingsEngine::new(path));
        let resolver = Arc::new(CommandStreamResolver::from_env());
        info!(extractor = %resolver.program().display(), "using stream extractor");
        let mut app = Self::new(
            settings,
            resolver,
            Box::new(HostPlayerSink::new(events.clone())),
            RemovalPolicy::default(),
        );
        app.history.subscribe(Box::new(events));
        app
    }

    pub fn resolver(&self) -> Arc<dyn StreamResolver> {
        self.resolver.clone()
    }

    /// Writes `items` to a playlist file.
    pub fn save_playlist(&self, path: &Path) -> Result<usize, PlaylistError> {
        playlist_io::save_playlist(path, self.history.items())?;
        Ok(self.history.len())
    }

    /// Replaces the history with a playlist file. The history is untouched
    /// when the file cannot be read.
    pub fn load_playlist(&mut self, path: &Path) -> Result<usize, PlaylistError> {
        let items = playlist_io::load_playlist(path)?;
        self.history.replace_all(items);
        Ok(self.history.len())
    }

    pub fn set_was_playing(&self, playing: bool) {
        if let Err(e) = self
            .settings
            .set_value(keys::WAS_PLAYING_ON_QUIT, Value::Bool(playing))
        {
            warn!("failed to store {}: {}", keys::WAS_PLAYING_ON_QUIT, e);
        }
    }

    /// Flushes the history and the playing flag, then stops the player.
    pub fn shutdown(&mut self) {
        let playing = self.playback.is_playing();
        if let Err(e) = self.history.persist_now() {
            warn!("failed to persist history on shutdown: {}", e);
        }
        self.set_was_playing(playing);
        self.playback.stop();
        info!(was_playing = playing, "shutdown complete");
    }
}

pub type SharedApp = Arc<Mutex<App>>;

pub fn shared(app: App) -> SharedApp {
    Arc::new(Mutex::new(app))
}

/// Locks the app, recovering from a poisoned lock.
pub fn lock_app(app: &SharedApp) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(|e| e.into_inner())
}

/// `add_or_bump` plus the asynchronous title lookup for the record.
pub fn add_or_bump(app: &SharedApp, url: &str, title: &str) -> usize {
    let index = lock_app(app).history.add_or_bump(url, title);
    schedule_title_refresh(app, url);
    index
}

/// Adds a user-entered URL with a placeholder title.
pub fn add_url(app: &SharedApp, url: &str) -> Result<usize, HistoryError> {
    let url = validate_watch_url(url)?;
    Ok(add_or_bump(app, &url, LOADING_TITLE))
}

/// Looks up the title of `url` in the background and replaces the stored
/// title in place. Failures are logged only. Does nothing outside a tokio
/// runtime.
pub fn schedule_title_refresh(app: &SharedApp, url: &str) -> Option<JoinHandle<()>> {
    let Ok(handle) = Handle::try_current() else {
        debug!(url, "no runtime, skipping title lookup");
        return None;
    };
    let resolver = lock_app(app).resolver();
    let app = app.clone();
    let url = url.to_string();
    Some(handle.spawn(async move {
        match resolver.resolve_title(&url).await {
            Ok(title) => {
                let changed = lock_app(&app).history.update_title(&url, &title);
                debug!(url = %url, changed, "title resolved");
            }
            Err(e) => warn!(url = %url, "title lookup failed: {}", e),
        }
    }))
}

/// Supersedes whatever is playing and resolves `url` in the background.
///
/// The session's current URL changes before this returns. Returns `None`
/// when there is no runtime to resolve on.
pub fn start_playback(app: &SharedApp, url: &str) -> Option<JoinHandle<PlaybackOutcome>> {
    let token = lock_app(app).playback.begin(url);
    let Ok(handle) = Handle::try_current() else {
        warn!(url, "no runtime, cannot resolve streams");
        return None;
    };
    let app = app.clone();
    let url = url.to_string();
    Some(handle.spawn(async move { finish_playback(&app, token, &url).await }))
}

/// Restarts the cursor record when the last session quit while playing.
pub fn resume_on_launch(app: &SharedApp) -> Option<JoinHandle<PlaybackOutcome>> {
    let url = {
        let a = lock_app(app);
        if !a.settings.app_settings().was_playing_on_quit {
            return None;
        }
        a.history.current()?.url.clone()
    };
    info!(url = %url, "resuming playback from last session");
    start_playback(app, &url)
}

/// Plays `url` and waits for the resolution to be applied.
pub async fn play_url(app: &SharedApp, url: &str) -> PlaybackOutcome {
    let token = lock_app(app).playback.begin(url);
    finish_playback(app, token, url).await
}

async fn finish_playback(app: &SharedApp, token: PlaybackToken, url: &str) -> PlaybackOutcome {
    let resolver = lock_app(app).resolver();
    let result = resolver.resolve_streams(url).await;

    let mut app = lock_app(app);
    let outcome = app.playback.complete(token, result);
    if matches!(outcome, PlaybackOutcome::Started(_)) {
        app.set_was_playing(true);
    }
    outcome
}

/// The player finished the current stream: advance the cursor and start the
/// next record, if any. Returns the record now playing.
pub fn on_end_of_media(app: &SharedApp) -> Option<VideoRecord> {
    let next = {
        let mut guard = lock_app(app);
        let App {
            history, playback, ..
        } = &mut *guard;
        let next = playback.end_of_media(history);
        guard.set_was_playing(false);
        next
    };
    if let Some(record) = &next {
        start_playback(app, &record.url);
    }
    next
}

/// Stops the player and clears the playing flag.
pub fn stop_playback(app: &SharedApp) {
    let mut app = lock_app(app);
    app.playback.stop();
    app.set_was_playing(false);
}
