//! Unit tests for the HistoryManager public API.
//!
//! These tests exercise add/bump, removal, selection, advancing, playlist
//! replacement, observers and settings write-through through the
//! `HistoryManagerTrait` interface.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tempfile::TempDir;

use youtube_mini::managers::history_manager::{
    HistoryManager, HistoryManagerTrait, HistoryObserver, RemovalPolicy, MAX_HISTORY,
};
use youtube_mini::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use youtube_mini::types::errors::HistoryError;
use youtube_mini::types::history::{HistorySnapshot, VideoRecord};
use youtube_mini::types::settings::keys;

fn url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Helper: history holding `ids` in order, cursor left as `add_or_bump` sets it.
fn history_with(ids: &[&str]) -> HistoryManager {
    let mut history = HistoryManager::new();
    for id in ids {
        history.add_or_bump(&url(id), id);
    }
    history
}

fn titles(history: &HistoryManager) -> Vec<String> {
    history.items().iter().map(|r| r.title.clone()).collect()
}

/// Records every snapshot it is handed.
#[derive(Clone, Default)]
struct RecordingObserver {
    seen: Arc<Mutex<Vec<HistorySnapshot>>>,
}

impl HistoryObserver for RecordingObserver {
    fn history_changed(&self, snapshot: &HistorySnapshot) {
        self.seen.lock().unwrap().push(snapshot.clone());
    }
}

// ─── add_or_bump ───

#[test]
fn test_first_add_selects_it() {
    let mut history = HistoryManager::new();
    let index = history.add_or_bump(&url("A"), "A");
    assert_eq!(index, 0);
    assert_eq!(history.current_index(), Some(0));
    assert_eq!(history.current().unwrap().url, url("A"));
}

#[test]
fn test_later_adds_leave_cursor_alone() {
    let history = history_with(&["A", "B", "C"]);
    assert_eq!(titles(&history), vec!["A", "B", "C"]);
    assert_eq!(history.current_index(), Some(0));
}

#[test]
fn test_bump_moves_to_end_with_new_title() {
    let mut history = history_with(&["A", "B", "C"]);
    history.select(2).unwrap();

    let index = history.add_or_bump(&url("A"), "A (again)");

    assert_eq!(index, 2);
    assert_eq!(history.len(), 3);
    assert_eq!(titles(&history), vec!["B", "C", "A (again)"]);
    // A sat below the cursor, so the cursor follows C down one slot
    assert_eq!(history.current_index(), Some(1));
    assert_eq!(history.current().unwrap().url, url("C"));
}

#[test]
fn test_bumping_the_current_item_clears_cursor() {
    let mut history = history_with(&["A", "B"]);
    history.add_or_bump(&url("A"), "A");
    assert_eq!(titles(&history), vec!["B", "A"]);
    assert_eq!(history.current_index(), None);
}

#[test]
fn test_overflow_evicts_oldest_and_clears_cursor_on_it() {
    let ids: Vec<String> = (0..MAX_HISTORY).map(|i| i.to_string()).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut history = history_with(&refs);
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.current_index(), Some(0));

    let index = history.add_or_bump(&url("new"), "new");

    assert_eq!(index, MAX_HISTORY - 1);
    assert_eq!(history.len(), MAX_HISTORY);
    assert!(!history.contains_url(&url("0")));
    assert_eq!(history.items()[0].url, url("1"));
    assert_eq!(history.current_index(), None);
}

#[test]
fn test_overflow_shifts_cursor_above_evicted_slot() {
    let ids: Vec<String> = (0..MAX_HISTORY).map(|i| i.to_string()).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut history = history_with(&refs);
    history.select(5).unwrap();

    history.add_or_bump(&url("new"), "new");

    assert_eq!(history.current_index(), Some(4));
    assert_eq!(history.current().unwrap().url, url("5"));
}

#[test]
fn test_overflow_keep_slot_policy_retains_position() {
    let mut history = HistoryManager::new().with_removal_policy(RemovalPolicy::KeepSlot);
    for i in 0..=MAX_HISTORY {
        history.add_or_bump(&url(&i.to_string()), &i.to_string());
    }
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.current_index(), Some(0));
    assert_eq!(history.current().unwrap().url, url("1"));
}

// ─── remove ───

#[test]
fn test_remove_below_cursor_decrements() {
    let mut history = history_with(&["A", "B", "C"]);
    history.select(2).unwrap();
    history.remove(0).unwrap();
    assert_eq!(titles(&history), vec!["B", "C"]);
    assert_eq!(history.current_index(), Some(1));
}

#[test]
fn test_remove_above_cursor_keeps_cursor() {
    let mut history = history_with(&["A", "B", "C"]);
    history.select(1).unwrap();
    history.remove(2).unwrap();
    assert_eq!(history.current_index(), Some(1));
}

#[test]
fn test_remove_at_cursor_clears_by_default() {
    let mut history = history_with(&["A", "B", "C"]);
    assert_eq!(history.removal_policy(), RemovalPolicy::ClearCursor);
    history.select(1).unwrap();
    history.remove(1).unwrap();
    assert_eq!(history.current_index(), None);
}

#[test]
fn test_remove_at_cursor_keep_slot_points_at_next() {
    let mut history = HistoryManager::new().with_removal_policy(RemovalPolicy::KeepSlot);
    for id in ["A", "B", "C"] {
        history.add_or_bump(&url(id), id);
    }
    history.select(1).unwrap();
    history.remove(1).unwrap();
    assert_eq!(history.current_index(), Some(1));
    assert_eq!(history.current().unwrap().url, url("C"));
}

#[test]
fn test_remove_out_of_range_fails_without_change() {
    let mut history = history_with(&["A"]);
    assert_eq!(
        history.remove(1),
        Err(HistoryError::OutOfRange { index: 1, len: 1 })
    );
    assert_eq!(history.len(), 1);
    assert_eq!(history.current_index(), Some(0));
}

// ─── select / advance_to_next ───

#[test]
fn test_select_out_of_range_fails() {
    let mut history = HistoryManager::new();
    assert_eq!(
        history.select(0),
        Err(HistoryError::OutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn test_advance_moves_cursor_and_returns_next() {
    let mut history = history_with(&["A", "B"]);
    let next = history.advance_to_next();
    assert_eq!(next, Some(VideoRecord::new(url("B"), "B")));
    assert_eq!(history.current_index(), Some(1));
}

#[test]
fn test_advance_is_noop_at_end_empty_or_unselected() {
    let mut empty = HistoryManager::new();
    assert_eq!(empty.advance_to_next(), None);
    assert_eq!(empty.current_index(), None);

    let mut at_end = history_with(&["A", "B"]);
    at_end.select(1).unwrap();
    assert_eq!(at_end.advance_to_next(), None);
    assert_eq!(at_end.current_index(), Some(1));

    let mut unselected = history_with(&["A", "B"]);
    unselected.remove(0).unwrap();
    assert_eq!(unselected.current_index(), None);
    assert_eq!(unselected.advance_to_next(), None);
    assert_eq!(unselected.current_index(), None);
}

// ─── replace_all / update_title / clear ───

#[test]
fn test_replace_all_resets_cursor_to_first() {
    let mut history = history_with(&["A", "B", "C"]);
    history.select(2).unwrap();
    history.replace_all(vec![
        VideoRecord::new(url("X"), "X"),
        VideoRecord::new(url("Y"), "Y"),
    ]);
    assert_eq!(titles(&history), vec!["X", "Y"]);
    assert_eq!(history.current_index(), Some(0));
}

#[test]
fn test_replace_all_with_empty_clears_cursor() {
    let mut history = history_with(&["A"]);
    history.replace_all(Vec::new());
    assert!(history.is_empty());
    assert_eq!(history.current_index(), None);
}

#[test]
fn test_replace_all_passes_duplicates_and_keeps_last_entries() {
    let mut history = HistoryManager::new();
    let mut items: Vec<VideoRecord> = (0..MAX_HISTORY + 3)
        .map(|i| VideoRecord::new(url(&i.to_string()), i.to_string()))
        .collect();
    items.push(VideoRecord::new(url("22"), "dup"));

    history.replace_all(items);

    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.items()[0].title, "4");
    assert_eq!(history.items().last().unwrap().title, "dup");
    assert_eq!(history.current_index(), Some(0));
}

#[test]
fn test_update_title_keeps_order_and_cursor() {
    let mut history = history_with(&["A", "B"]);
    history.select(1).unwrap();
    assert!(history.update_title(&url("A"), "Real A"));
    assert!(!history.update_title(&url("A"), "Real A"));
    assert!(!history.update_title(&url("missing"), "x"));
    assert_eq!(titles(&history), vec!["Real A", "B"]);
    assert_eq!(history.current_index(), Some(1));
}

#[test]
fn test_clear_empties_history() {
    let mut history = history_with(&["A", "B"]);
    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.current_index(), None);
}

// ─── Observers ───

#[test]
fn test_observer_sees_every_mutation() {
    let observer = RecordingObserver::default();
    let mut history = HistoryManager::new();
    history.subscribe(Box::new(observer.clone()));

    history.add_or_bump(&url("A"), "A");
    history.add_or_bump(&url("B"), "B");
    history.select(1).unwrap();
    let _ = history.select(9);
    history.advance_to_next();

    let seen = observer.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].items.len(), 1);
    assert_eq!(seen[0].current_index, Some(0));
    assert_eq!(seen[2].current_index, Some(1));
    assert_eq!(seen[2].current().unwrap().url, url("B"));
}

// ─── Serialization ───

#[test]
fn test_serialize_writes_explicit_null_cursor() {
    let mut history = history_with(&["A"]);
    history.remove(0).unwrap();
    let blob = history.serialize().unwrap();
    let raw: Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(raw["currentIndex"], Value::Null);
    assert_eq!(raw["history"], Value::Array(Vec::new()));
}

#[test]
fn test_deserialize_recovers_each_field_independently() {
    let good_items = format!(r#"[{{"url":"{}","title":"A"}}]"#, url("A"));

    let history = HistoryManager::deserialize(&format!(
        r#"{{"history":{},"currentIndex":5}}"#,
        good_items
    ));
    assert_eq!(history.len(), 1);
    assert_eq!(history.current_index(), None);

    let history = HistoryManager::deserialize(&format!(
        r#"{{"history":{},"currentIndex":"zero"}}"#,
        good_items
    ));
    assert_eq!(history.len(), 1);
    assert_eq!(history.current_index(), None);

    let history = HistoryManager::deserialize(r#"{"history":"oops","currentIndex":0}"#);
    assert!(history.is_empty());
    assert_eq!(history.current_index(), None);

    let history = HistoryManager::deserialize("not json at all");
    assert!(history.is_empty());
}

// ─── Settings write-through ───

#[test]
fn test_mutations_persist_through_settings_engine() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join("settings.json").to_string_lossy().to_string();
    let settings = Arc::new(SettingsEngine::new(Some(path.clone())));

    let mut history = HistoryManager::new();
    history.attach_persistence(settings.clone());
    history.add_or_bump(&url("A"), "A");
    history.add_or_bump(&url("B"), "B");
    history.advance_to_next();

    let reloaded = SettingsEngine::new(Some(path));
    reloaded.load().unwrap();
    let restored = HistoryManager::from_values(
        reloaded.get_value(keys::HISTORY).as_ref(),
        reloaded.get_value(keys::CURRENT_INDEX).as_ref(),
    );
    assert_eq!(restored.snapshot(), history.snapshot());
    assert_eq!(restored.current_index(), Some(1));
}
