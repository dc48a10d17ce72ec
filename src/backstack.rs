//! Ordered back stack of visited destinations.
//!
//! The stack is oldest-first: the last entry is the current destination.
//! It is never empty between initialization and teardown, and its bottom
//! entry cannot be popped on its own.

use crate::store::{InMemorySavedStateStore, SavedStateStore};
use crate::types::{BackStackEntry, DestinationId, SavedState};

/// Error type for back stack operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackStackError {
    /// No entry matched the pop predicate.
    #[error("Target not on back stack")]
    TargetNotOnStack,
    /// The pop would remove every entry.
    #[error("Root entry cannot be evicted")]
    RootNotEvictable,
    /// The stack has been torn down.
    #[error("Back stack is empty")]
    EmptyStack,
}

/// Back stack plus its saved-state side table.
#[derive(Debug)]
pub struct BackStack<S: SavedStateStore = InMemorySavedStateStore> {
    entries: Vec<BackStackEntry>,
    next_sequence: u64,
    saved: S,
}

impl<S: SavedStateStore> BackStack<S> {
    /// Create a stack holding a single entry for `root`.
    pub fn new(root: DestinationId, saved: S) -> Self {
        Self::with_root(BackStackEntry::new(root, 0), saved)
    }

    /// Create a stack whose bottom entry is `root`. The entry gets sequence 0.
    pub fn with_root(root: BackStackEntry, saved: S) -> Self {
        let mut stack = Self {
            entries: Vec::new(),
            next_sequence: 0,
            saved,
        };
        stack.push(root);
        stack
    }

    /// Append an entry. Its sequence number is assigned here, one above
    /// every sequence this stack has handed out before.
    pub fn push(&mut self, mut entry: BackStackEntry) -> &BackStackEntry {
        entry.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Number of entries that would remain after popping to the topmost
    /// entry matching `predicate`. Does not modify the stack.
    pub fn pop_plan<P>(&self, predicate: P, inclusive: bool) -> Result<usize, BackStackError>
    where
        P: Fn(&BackStackEntry) -> bool,
    {
        if self.entries.is_empty() {
            return Err(BackStackError::EmptyStack);
        }
        let index = self
            .entries
            .iter()
            .rposition(predicate)
            .ok_or(BackStackError::TargetNotOnStack)?;
        Ok(if inclusive { index } else { index + 1 })
    }

    /// Remove entries from the top until the topmost entry matching
    /// `predicate` is reached; with `inclusive` that entry goes too.
    ///
    /// Returns the removed entries, top first. Fails without touching the
    /// stack if nothing matches or if the pop would empty the stack.
    pub fn pop_to<P>(&mut self, predicate: P, inclusive: bool) -> Result<Vec<BackStackEntry>, BackStackError>
    where
        P: Fn(&BackStackEntry) -> bool,
    {
        let keep = self.pop_plan(predicate, inclusive)?;
        if keep == 0 {
            return Err(BackStackError::RootNotEvictable);
        }
        Ok(self.truncate(keep))
    }

    /// Pop exactly one entry. `None` when only the root remains.
    pub fn pop(&mut self) -> Option<BackStackEntry> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Keep the first `keep` entries and return the rest, top first.
    ///
    /// May leave the stack empty; callers must push immediately after.
    pub(crate) fn truncate(&mut self, keep: usize) -> Vec<BackStackEntry> {
        let keep = keep.min(self.entries.len());
        let mut removed = self.entries.split_off(keep);
        removed.reverse();
        removed
    }

    /// Keep the state bags of removed entries, keyed by destination id.
    ///
    /// When a destination occurs more than once, the bag of its most
    /// recently created entry is the one kept.
    pub fn save_state(&mut self, entries: &[BackStackEntry]) {
        let mut ordered: Vec<&BackStackEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.sequence);
        for entry in ordered {
            self.saved
                .save(entry.destination_id.clone(), entry.saved_state.clone());
        }
    }

    /// Take the bag saved for `id`, if any.
    pub fn restore_state(&mut self, id: &DestinationId) -> Option<SavedState> {
        self.saved.take(id)
    }

    /// Read the bag saved for `id` without consuming it.
    pub fn peek_saved_state(&self, id: &DestinationId) -> Option<&SavedState> {
        self.saved.peek(id)
    }

    /// Top entry.
    pub fn current(&self) -> Result<&BackStackEntry, BackStackError> {
        self.entries.last().ok_or(BackStackError::EmptyStack)
    }

    /// Top entry, mutably.
    pub fn current_mut(&mut self) -> Result<&mut BackStackEntry, BackStackError> {
        self.entries.last_mut().ok_or(BackStackError::EmptyStack)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[BackStackEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the stack has been torn down.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saved-state table.
    pub fn saved_states(&self) -> &S {
        &self.saved
    }

    /// Remove every entry and drop all saved state. Returns the entries,
    /// oldest first.
    pub fn clear(&mut self) -> Vec<BackStackEntry> {
        self.saved.clear();
        std::mem::take(&mut self.entries)
    }
}
