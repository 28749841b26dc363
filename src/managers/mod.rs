// YouTubeMini state managers
// Managers own mutable state: the watch history, the playback session and the browser poll loop.

pub mod history_manager;
pub mod playback_session;
pub mod poller;
