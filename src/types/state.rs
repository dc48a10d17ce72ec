//! Published navigation state and transition results.
//!
//! `NavigationState` is the only value the rendering layer observes. It is
//! rebuilt and republished after every intent that changes the back stack
//! and left untouched by no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::destination::DestinationId;
use super::entry::{BackStackEntry, EntryId};
use crate::canonical::canonical_hash_hex;

/// Snapshot of the controller published to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Destination displayed by the top entry.
    pub current_destination_id: DestinationId,
    /// Id of the top entry.
    pub current_entry_id: EntryId,
    /// Number of entries on the back stack.
    pub back_stack_depth: usize,
    /// Selected tab, or `None` when the current destination is under no tab.
    pub current_tab_id: Option<DestinationId>,
    /// Destination ids on the stack, oldest first.
    pub back_stack: Vec<DestinationId>,
    /// Entry ids on the stack, aligned with `back_stack`.
    pub entry_ids: Vec<EntryId>,
    /// Publish counter, incremented on every change.
    pub version: u64,
    /// When this snapshot was published.
    pub published_at: DateTime<Utc>,
}

impl NavigationState {
    /// Build a snapshot from a stack, top last.
    ///
    /// Returns `None` for an empty stack.
    pub fn from_entries(
        entries: &[BackStackEntry],
        current_tab_id: Option<DestinationId>,
        version: u64,
    ) -> Option<Self> {
        let top = entries.last()?;
        Some(Self {
            current_destination_id: top.destination_id.clone(),
            current_entry_id: top.id,
            back_stack_depth: entries.len(),
            current_tab_id,
            back_stack: entries.iter().map(|e| e.destination_id.clone()).collect(),
            entry_ids: entries.iter().map(|e| e.id).collect(),
            version,
            published_at: Utc::now(),
        })
    }

    /// Version-zero snapshot of a stack holding only `root`.
    pub fn initial(root: &BackStackEntry, current_tab_id: Option<DestinationId>) -> Self {
        Self {
            current_destination_id: root.destination_id.clone(),
            current_entry_id: root.id,
            back_stack_depth: 1,
            current_tab_id,
            back_stack: vec![root.destination_id.clone()],
            entry_ids: vec![root.id],
            version: 0,
            published_at: Utc::now(),
        }
    }

    /// Deterministic fingerprint of the stack contents.
    ///
    /// Two snapshots with the same entries in the same order share a
    /// fingerprint regardless of version or publish time.
    pub fn stack_fingerprint(&self) -> String {
        let pairs: Vec<(&str, String)> = self
            .back_stack
            .iter()
            .zip(&self.entry_ids)
            .map(|(dest, entry)| (dest.as_str(), entry.to_string()))
            .collect();
        canonical_hash_hex(&pairs)
    }

    /// Check if `id` is the current destination.
    pub fn is_current(&self, id: &DestinationId) -> bool {
        &self.current_destination_id == id
    }
}

/// What an intent did to the back stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// A new entry was pushed (possibly after popping).
    Pushed,
    /// Entries were popped and the existing top matched the single-top target.
    ReusedTop,
    /// Entries were popped, nothing pushed.
    Popped,
    /// Nothing changed; no state was published.
    Unchanged,
}

/// Result of one processed intent.
#[derive(Debug, Clone)]
pub struct Transition {
    /// What happened.
    pub kind: TransitionKind,
    /// Entries removed from the stack, top first.
    pub removed: Vec<BackStackEntry>,
    /// Top entry after the intent.
    pub current: BackStackEntry,
    /// Published state after the intent (the previous state for no-ops).
    pub state: std::sync::Arc<NavigationState>,
}

impl Transition {
    /// Check if the intent changed the stack.
    pub fn changed(&self) -> bool {
        self.kind != TransitionKind::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(ids: &[&str]) -> Vec<BackStackEntry> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| BackStackEntry::new(DestinationId::new(*id), i as u64))
            .collect()
    }

    #[test]
    fn test_from_entries_reads_top() {
        let stack = entries(&["linear_a", "linear_b"]);
        let state = NavigationState::from_entries(&stack, None, 3).unwrap();

        assert_eq!(state.current_destination_id, "linear_b");
        assert_eq!(state.current_entry_id, stack[1].id);
        assert_eq!(state.back_stack_depth, 2);
        assert_eq!(state.version, 3);
        assert!(state.is_current(&DestinationId::new("linear_b")));
    }

    #[test]
    fn test_initial_matches_single_entry_stack() {
        let stack = entries(&["home"]);
        let initial = NavigationState::initial(&stack[0], Some(DestinationId::new("home")));
        let built =
            NavigationState::from_entries(&stack, Some(DestinationId::new("home")), 0).unwrap();

        assert_eq!(initial.version, 0);
        assert_eq!(initial.back_stack, built.back_stack);
        assert_eq!(initial.entry_ids, built.entry_ids);
        assert_eq!(initial.current_tab_id, built.current_tab_id);
        assert_eq!(initial.stack_fingerprint(), built.stack_fingerprint());
    }

    #[test]
    fn test_from_empty_entries() {
        assert!(NavigationState::from_entries(&[], None, 0).is_none());
    }

    #[test]
    fn test_fingerprint_ignores_version() {
        let stack = entries(&["home", "profile"]);
        let s1 = NavigationState::from_entries(&stack, None, 1).unwrap();
        let s2 = NavigationState::from_entries(&stack, None, 2).unwrap();
        assert_eq!(s1.stack_fingerprint(), s2.stack_fingerprint());

        let other = entries(&["home", "profile"]);
        let s3 = NavigationState::from_entries(&other, None, 1).unwrap();
        // Fresh entries carry fresh ids.
        assert_ne!(s1.stack_fingerprint(), s3.stack_fingerprint());
    }
}
