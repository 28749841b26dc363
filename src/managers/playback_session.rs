//! Playback Session for YouTubeMini.
//!
//! Tracks which URL is playing and drives the media player sink. Resolution
//! is asynchronous, so playing a URL is split into [`PlaybackSession::begin`]
//! (synchronous, hands out a token) and [`PlaybackSession::complete`] (applies
//! the resolver result only if the token is still current).

use tracing::{debug, info, warn};

use crate::managers::history_manager::HistoryManagerTrait;
use crate::services::media_sink::MediaPlayerSink;
use crate::services::stream_resolver::select_best_stream;
use crate::types::errors::{PlaybackError, ResolverError};
use crate::types::history::VideoRecord;
use crate::types::stream::StreamInfo;

/// Identifies one `begin` call. Only the most recent token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Resolving,
    Playing,
    Failed,
}

/// Result of applying a resolution to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    Started(StreamInfo),
    /// A newer `begin` (or `stop`) happened while this one was resolving.
    Superseded,
    Failed(PlaybackError),
}

pub struct PlaybackSession {
    sink: Box<dyn MediaPlayerSink>,
    generation: u64,
    current_url: Option<String>,
    state: PlaybackState,
}

impl PlaybackSession {
    pub fn new(sink: Box<dyn MediaPlayerSink>) -> Self {
        Self {
            sink,
            generation: 0,
            current_url: None,
            state: PlaybackState::Idle,
        }
    }

    /// Starts playing `url`: supersedes any in-flight resolution and stops the
    /// current stream. The caller resolves streams and passes them to
    /// [`PlaybackSession::complete`] with the returned token.
    pub fn begin(&mut self, url: &str) -> PlaybackToken {
        self.generation += 1;
        self.sink.stop();
        self.current_url = Some(url.to_string());
        self.state = PlaybackState::Resolving;
        debug!(url, generation = self.generation, "playback begin");
        PlaybackToken(self.generation)
    }

    pub fn is_current(&self, token: PlaybackToken) -> bool {
        token.0 == self.generation
    }

    /// Applies a resolution result. Stale tokens are ignored.
    pub fn complete(
        &mut self,
        token: PlaybackToken,
        result: Result<Vec<StreamInfo>, ResolverError>,
    ) -> PlaybackOutcome {
        if !self.is_current(token) {
            debug!(token = token.0, current = self.generation, "ignoring stale resolution");
            return PlaybackOutcome::Superseded;
        }
        let url = self.current_url.clone().unwrap_or_default();

        let streams = match result {
            Ok(streams) => streams,
            Err(e) => {
                warn!(url = %url, "stream resolution failed: {}", e);
                self.state = PlaybackState::Failed;
                return PlaybackOutcome::Failed(PlaybackError::from(e));
            }
        };

        let Some(stream) = select_best_stream(&streams).cloned() else {
            warn!(url = %url, offered = streams.len(), "no natively playable stream");
            self.state = PlaybackState::Failed;
            return PlaybackOutcome::Failed(PlaybackError::NoPlayableStream(url));
        };

        match self.sink.load(&stream.url) {
            Ok(()) => {
                info!(url = %url, resolution = ?stream.resolution, "playback started");
                self.state = PlaybackState::Playing;
                PlaybackOutcome::Started(stream)
            }
            Err(e) => {
                warn!(url = %url, "media player rejected stream: {}", e);
                self.state = PlaybackState::Failed;
                PlaybackOutcome::Failed(e)
            }
        }
    }

    /// Stops playback and invalidates any in-flight resolution.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.sink.stop();
        self.current_url = None;
        self.state = PlaybackState::Idle;
    }

    /// Handles the player reaching the end of the stream: advances the history
    /// cursor and returns the record to play next, if there is one.
    pub fn end_of_media(&mut self, history: &mut impl HistoryManagerTrait) -> Option<VideoRecord> {
        self.state = PlaybackState::Idle;
        let next = history.advance_to_next();
        match &next {
            Some(record) => info!(url = %record.url, "autoplaying next video"),
            None => debug!("end of history, nothing to autoplay"),
        }
        next
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// The URL being resolved or played. `None` once that attempt failed.
    pub fn active_url(&self) -> Option<&str> {
        match self.state {
            PlaybackState::Resolving | PlaybackState::Playing => self.current_url(),
            PlaybackState::Idle | PlaybackState::Failed => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }
}
