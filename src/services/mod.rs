// YouTubeMini services
// Services talk to the outside world: settings file, playlists, stream extraction, browser tabs and the host process.

pub mod host_events;
pub mod media_sink;
pub mod playlist_io;
pub mod settings_engine;
pub mod stream_resolver;
pub mod tab_observer;
pub mod url_matcher;
