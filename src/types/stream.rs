use serde::{Deserialize, Serialize};

/// A single media stream offered by a stream resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamInfo {
    /// Direct media URL handed to the player.
    pub url: String,
    /// Vertical resolution in pixels, when known.
    pub resolution: Option<u32>,
    /// Container extension, e.g. `mp4` or `webm`.
    pub file_extension: String,
    /// Whether the native player can decode this stream as-is
    /// (single-file container carrying both audio and video).
    pub natively_playable: bool,
}

impl StreamInfo {
    pub fn resolution_or_zero(&self) -> u32 {
        self.resolution.unwrap_or(0)
    }
}
