// YouTubeMini platform paths for Windows
// Config: %APPDATA%/YouTubeMini
// Data:   %APPDATA%/YouTubeMini/playlists

use std::env;
use std::path::PathBuf;

fn appdata() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
}

pub fn get_config_dir() -> PathBuf {
    appdata().join("YouTubeMini")
}

pub fn get_data_dir() -> PathBuf {
    appdata().join("YouTubeMini").join("playlists")
}
