//! Saved-state side table backends.
//!
//! When entries are popped with `save_state`, their bags are kept here,
//! keyed by destination id, until a later `restore_state` navigation to the
//! same destination takes them back.

pub mod memory;

use crate::types::{DestinationId, SavedState};

/// Trait for saved-state side tables.
///
/// Implementations keep at most one bag per destination id; a later save
/// for the same id replaces the earlier one.
pub trait SavedStateStore: Send {
    /// Keep `state` for `id`, replacing any bag already stored for it.
    fn save(&mut self, id: DestinationId, state: SavedState);

    /// Remove and return the bag stored for `id`.
    fn take(&mut self, id: &DestinationId) -> Option<SavedState>;

    /// Read the bag stored for `id` without removing it.
    fn peek(&self, id: &DestinationId) -> Option<&SavedState>;

    /// Drop the bag stored for `id`. Returns whether one existed.
    fn discard(&mut self, id: &DestinationId) -> bool {
        self.take(id).is_some()
    }

    /// Number of stored bags.
    fn len(&self) -> usize;

    /// Check if no bags are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored bag.
    fn clear(&mut self);
}

pub use memory::{InMemorySavedStateStore, SavedStateConfig, SavedStateStats};
