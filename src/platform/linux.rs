// YouTubeMini platform paths for Linux
// Config: ~/.config/youtube-mini
// Data:   ~/.local/share/youtube-mini

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/youtube-mini` if set, otherwise `~/.config/youtube-mini`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("youtube-mini"),
        _ => home_dir().join(".config").join("youtube-mini"),
    }
}

/// Uses `$XDG_DATA_HOME/youtube-mini` if set, otherwise `~/.local/share/youtube-mini`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("youtube-mini"),
        _ => home_dir().join(".local").join("share").join("youtube-mini"),
    }
}
