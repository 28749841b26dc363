//! Playlist files: a JSON array of `{url, title}` objects.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::types::errors::PlaylistError;
use crate::types::history::VideoRecord;

/// Writes `items` to `path`, creating parent directories.
pub fn save_playlist(path: &Path, items: &[VideoRecord]) -> Result<(), PlaylistError> {
    if items.is_empty() {
        return Err(PlaylistError::Empty);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                PlaylistError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
    }

    let json = serde_json::to_string_pretty(items)
        .map_err(|e| PlaylistError::SerializationError(e.to_string()))?;
    fs::write(path, json)
        .map_err(|e| PlaylistError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), count = items.len(), "saved playlist");
    Ok(())
}

/// Reads a playlist file. The records are returned in file order, unvalidated.
pub fn load_playlist(path: &Path) -> Result<Vec<VideoRecord>, PlaylistError> {
    let content = fs::read_to_string(path)
        .map_err(|e| PlaylistError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    let items: Vec<VideoRecord> = serde_json::from_str(&content)
        .map_err(|e| PlaylistError::SerializationError(e.to_string()))?;

    info!(path = %path.display(), count = items.len(), "loaded playlist");
    Ok(items)
}
