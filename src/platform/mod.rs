// YouTubeMini platform abstraction
// Resolves where settings and saved playlists live on each OS.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/youtube-mini` or `~/.config/youtube-mini`
/// - **macOS**: `~/Library/Preferences/YouTubeMini`
/// - **Windows**: `%APPDATA%/YouTubeMini`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the directory used for playlists saved without an explicit path.
///
/// - **Linux**: `$XDG_DATA_HOME/youtube-mini` or `~/.local/share/youtube-mini`
/// - **macOS**: `~/Library/Application Support/YouTubeMini`
/// - **Windows**: `%APPDATA%/YouTubeMini/playlists`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
