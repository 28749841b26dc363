//! Property-based tests for History Manager operations.
//!
//! Arbitrary sequences of mutations are applied both to `HistoryManager` and
//! to a small reference model; after every step the two must agree and the
//! history invariants must hold: at most `MAX_HISTORY` items, unique URLs, and
//! a cursor that is either `None` or a valid index.

use std::collections::HashSet;

use proptest::prelude::*;

use youtube_mini::managers::history_manager::{
    HistoryManager, HistoryManagerTrait, RemovalPolicy, MAX_HISTORY,
};
use youtube_mini::types::history::VideoRecord;

#[derive(Debug, Clone)]
enum Op {
    Add(u8, String),
    Remove(usize),
    Select(usize),
    Advance,
    Replace(Vec<u8>),
}

fn url(id: u8) -> String {
    format!("https://www.youtube.com/watch?v=vid{}", id)
}

/// Strategy for one mutation. Ids are drawn from a pool larger than the
/// capacity so that both bumps and evictions happen.
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..30, "[a-zA-Z ]{1,12}").prop_map(|(id, title)| Op::Add(id, title)),
        2 => (0usize..24).prop_map(Op::Remove),
        1 => (0usize..24).prop_map(Op::Select),
        2 => Just(Op::Advance),
        1 => proptest::collection::vec(0u8..30, 0..8).prop_map(Op::Replace),
    ]
}

/// Reference model of the cursor rules.
#[derive(Debug, Default)]
struct Model {
    items: Vec<VideoRecord>,
    cursor: Option<usize>,
    keep_slot: bool,
}

impl Model {
    fn remove_at(&mut self, i: usize) {
        self.items.remove(i);
        self.cursor = match self.cursor {
            Some(c) if i < c => Some(c - 1),
            Some(c) if i == c => {
                if self.keep_slot && !self.items.is_empty() {
                    Some(c.min(self.items.len() - 1))
                } else {
                    None
                }
            }
            other => other,
        };
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Add(id, title) => {
                let was_empty = self.items.is_empty() && self.cursor.is_none();
                if let Some(i) = self.items.iter().position(|r| r.url == url(*id)) {
                    self.remove_at(i);
                }
                self.items.push(VideoRecord::new(url(*id), title.clone()));
                while self.items.len() > MAX_HISTORY {
                    self.remove_at(0);
                }
                if was_empty {
                    self.cursor = Some(0);
                }
            }
            Op::Remove(i) => {
                if *i < self.items.len() {
                    self.remove_at(*i);
                }
            }
            Op::Select(i) => {
                if *i < self.items.len() {
                    self.cursor = Some(*i);
                }
            }
            Op::Advance => {
                if let Some(c) = self.cursor {
                    if c + 1 < self.items.len() {
                        self.cursor = Some(c + 1);
                    }
                }
            }
            Op::Replace(ids) => {
                // Replacement lists are de-duplicated so the model stays simple
                let mut seen = HashSet::new();
                self.items = ids
                    .iter()
                    .filter(|id| seen.insert(**id))
                    .map(|id| VideoRecord::new(url(*id), "loaded"))
                    .collect();
                self.cursor = if self.items.is_empty() { None } else { Some(0) };
            }
        }
    }
}

fn apply(history: &mut HistoryManager, op: &Op) {
    match op {
        Op::Add(id, title) => {
            let index = history.add_or_bump(&url(*id), title);
            assert_eq!(index, history.len() - 1);
        }
        Op::Remove(i) => {
            let _ = history.remove(*i);
        }
        Op::Select(i) => {
            let _ = history.select(*i);
        }
        Op::Advance => {
            history.advance_to_next();
        }
        Op::Replace(ids) => {
            let mut seen = HashSet::new();
            let items = ids
                .iter()
                .filter(|id| seen.insert(**id))
                .map(|id| VideoRecord::new(url(*id), "loaded"))
                .collect();
            history.replace_all(items);
        }
    }
}

fn check_invariants(history: &HistoryManager) -> Result<(), TestCaseError> {
    prop_assert!(history.len() <= MAX_HISTORY);
    let urls: HashSet<&str> = history.items().iter().map(|r| r.url.as_str()).collect();
    prop_assert_eq!(urls.len(), history.len());
    if let Some(c) = history.current_index() {
        prop_assert!(c < history.len());
    }
    Ok(())
}

// **Property: history matches the reference model**
//
// *For any* sequence of operations, under either removal policy, the items
// and cursor equal the model's and the invariants hold after every step.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn history_tracks_reference_model(
        ops in proptest::collection::vec(arb_op(), 1..80),
        keep_slot in any::<bool>(),
    ) {
        let policy = if keep_slot { RemovalPolicy::KeepSlot } else { RemovalPolicy::ClearCursor };
        let mut history = HistoryManager::new().with_removal_policy(policy);
        let mut model = Model { keep_slot, ..Model::default() };

        for op in &ops {
            apply(&mut history, op);
            model.apply(op);
            check_invariants(&history)?;
            prop_assert_eq!(history.items(), model.items.as_slice());
            prop_assert_eq!(history.current_index(), model.cursor);
        }
    }

    #[test]
    fn bump_keeps_length_and_moves_to_end(
        ids in proptest::collection::vec(0u8..30, 1..25),
        pick in any::<proptest::sample::Index>(),
        new_title in "[a-z]{1,10}",
    ) {
        let mut history = HistoryManager::new();
        for id in &ids {
            history.add_or_bump(&url(*id), "t");
        }
        let before = history.len();
        let target = history.items()[pick.index(before)].url.clone();

        let index = history.add_or_bump(&target, &new_title);

        prop_assert_eq!(history.len(), before);
        prop_assert_eq!(index, before - 1);
        prop_assert_eq!(&history.items()[index], &VideoRecord::new(target, new_title));
    }

    #[test]
    fn advance_without_next_never_mutates(
        ids in proptest::collection::vec(0u8..30, 0..25),
    ) {
        let mut history = HistoryManager::new();
        for id in &ids {
            history.add_or_bump(&url(*id), "t");
        }
        if !history.is_empty() {
            let last = history.len() - 1;
            history.select(last).unwrap();
        }
        let before = history.snapshot();

        prop_assert!(history.advance_to_next().is_none());
        prop_assert_eq!(history.snapshot(), before);
    }
}
