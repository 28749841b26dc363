use std::fmt;

// === HistoryError ===

/// Errors returned by history store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// An index-based operation received an index outside `[0, len)`.
    OutOfRange { index: usize, len: usize },
    /// The URL is not a YouTube watch or shorts URL.
    InvalidUrl(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::OutOfRange { index, len } => {
                write!(f, "History index {} out of range (len {})", index, len)
            }
            HistoryError::InvalidUrl(url) => write!(f, "Invalid YouTube URL: {}", url),
        }
    }
}

impl std::error::Error for HistoryError {}

// === ResolverError ===

/// Failures reported by a stream resolver while extracting a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The extractor could not pull stream data out of the watch page.
    Extraction(String),
    /// The extractor output could not be parsed.
    Parse(String),
    VideoPrivate,
    VideoUnavailable,
    AgeRestricted,
    RegionBlocked,
    LiveStream,
    MembersOnly,
    MaxRetriesExceeded,
    /// A format pattern did not match the page contents.
    RegexMismatch(String),
    /// The external extractor program failed to start or exited abnormally.
    ProgramFailed(String),
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverError::Extraction(msg) => write!(f, "Extraction failed: {}", msg),
            ResolverError::Parse(msg) => write!(f, "Resolver parse error: {}", msg),
            ResolverError::VideoPrivate => write!(f, "Video is private"),
            ResolverError::VideoUnavailable => write!(f, "Video is unavailable"),
            ResolverError::AgeRestricted => write!(f, "Video is age restricted"),
            ResolverError::RegionBlocked => write!(f, "Video is blocked in this region"),
            ResolverError::LiveStream => write!(f, "Live streams are not supported"),
            ResolverError::MembersOnly => write!(f, "Video is members-only"),
            ResolverError::MaxRetriesExceeded => write!(f, "Maximum retries exceeded"),
            ResolverError::RegexMismatch(pattern) => {
                write!(f, "Format pattern did not match: {}", pattern)
            }
            ResolverError::ProgramFailed(msg) => write!(f, "Extractor program failed: {}", msg),
        }
    }
}

impl std::error::Error for ResolverError {}

// === PlaybackError ===

/// Errors raised while starting playback of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The stream resolver failed for the requested URL.
    StreamResolutionFailed(ResolverError),
    /// Resolution succeeded but no stream is natively playable.
    NoPlayableStream(String),
    /// The media player sink rejected the stream.
    Sink(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::StreamResolutionFailed(err) => {
                write!(f, "Stream resolution failed: {}", err)
            }
            PlaybackError::NoPlayableStream(url) => {
                write!(f, "No natively playable stream for {}", url)
            }
            PlaybackError::Sink(msg) => write!(f, "Media player error: {}", msg),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::StreamResolutionFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolverError> for PlaybackError {
    fn from(err: ResolverError) -> Self {
        PlaybackError::StreamResolutionFailed(err)
    }
}

// === SettingsError ===

/// Errors related to the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is not known.
    InvalidKey(String),
    /// The provided settings value does not fit the key's type.
    InvalidValue(String),
    /// A stored value was malformed and has been discarded.
    PersistenceReadInvalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
            SettingsError::PersistenceReadInvalid(msg) => {
                write!(f, "Discarded invalid stored value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === PlaylistError ===

/// Errors related to saving and loading playlist files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    /// There is nothing to save.
    Empty,
    /// Reading or writing the playlist file failed.
    IoError(String),
    /// The playlist file is not a JSON array of `{url, title}` objects.
    SerializationError(String),
}

impl fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistError::Empty => write!(f, "The playlist is empty"),
            PlaylistError::IoError(msg) => write!(f, "Playlist I/O error: {}", msg),
            PlaylistError::SerializationError(msg) => {
                write!(f, "Playlist format error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PlaylistError {}

// === ObserverError ===

/// Errors reported by a browser tab observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The browser process is not running.
    BrowserNotRunning,
    /// The browser has no front window or active tab.
    NoActiveTab,
    /// The browser automation call failed.
    ScriptFailed(String),
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverError::BrowserNotRunning => write!(f, "Browser is not running"),
            ObserverError::NoActiveTab => write!(f, "Browser has no active tab"),
            ObserverError::ScriptFailed(msg) => write!(f, "Browser script failed: {}", msg),
        }
    }
}

impl std::error::Error for ObserverError {}
