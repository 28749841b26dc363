//! Property-based tests for playlist files.
//!
//! A saved playlist loads back as the same records in the same order, and
//! loading it into a history selects the first record.

use proptest::prelude::*;
use tempfile::TempDir;

use youtube_mini::managers::history_manager::{HistoryManager, HistoryManagerTrait, MAX_HISTORY};
use youtube_mini::services::playlist_io::{load_playlist, save_playlist};
use youtube_mini::types::history::VideoRecord;

fn arb_records() -> impl Strategy<Value = Vec<VideoRecord>> {
    proptest::collection::btree_map("[A-Za-z0-9_-]{11}", "\\PC{0,40}", 1..MAX_HISTORY).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, title)| {
                    VideoRecord::new(format!("https://www.youtube.com/watch?v={}", id), title)
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn saved_playlist_loads_into_history(records in arb_records()) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("playlist.json");

        save_playlist(&path, &records).unwrap();
        let loaded = load_playlist(&path).unwrap();
        prop_assert_eq!(&loaded, &records);

        let mut history = HistoryManager::new();
        history.add_or_bump("https://www.youtube.com/watch?v=previous", "old");
        history.replace_all(loaded);
        prop_assert_eq!(history.items(), records.as_slice());
        prop_assert_eq!(history.current_index(), Some(0));
    }
}
