//! The surface that actually renders a resolved stream.

use serde_json::json;

use crate::services::host_events::HostEvents;
use crate::types::errors::PlaybackError;

/// A native video player. `load` replaces whatever is playing and starts the
/// new stream.
pub trait MediaPlayerSink: Send {
    fn load(&mut self, stream_url: &str) -> Result<(), PlaybackError>;
    fn stop(&mut self);
}

/// Forwards player commands to the host process as `player.load` /
/// `player.stop` events.
pub struct HostPlayerSink {
    events: HostEvents,
    loaded: bool,
}

impl HostPlayerSink {
    pub fn new(events: HostEvents) -> Self {
        Self {
            events,
            loaded: false,
        }
    }
}

impl MediaPlayerSink for HostPlayerSink {
    fn load(&mut self, stream_url: &str) -> Result<(), PlaybackError> {
        if stream_url.is_empty() {
            return Err(PlaybackError::Sink("empty stream URL".to_string()));
        }
        self.events.emit("player.load", json!({ "url": stream_url }));
        self.loaded = true;
        Ok(())
    }

    /// Only emits when something was loaded, so repeated stops stay quiet.
    fn stop(&mut self) {
        if self.loaded {
            self.events.emit("player.stop", serde_json::Value::Null);
            self.loaded = false;
        }
    }
}
