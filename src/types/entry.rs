//! Back stack entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::destination::DestinationId;

/// Unique identifier for one occurrence of a destination on the back stack.
///
/// Two pushes of the same destination produce two different entry ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create an EntryId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random EntryId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque UI-owned state bag attached to a back stack entry.
///
/// The controller stores and returns bags but never interprets their
/// contents. Keys are kept in a `BTreeMap` so equal bags serialize equally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedState(BTreeMap<String, serde_json::Value>);

impl SavedState {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    /// Number of keys in the bag.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the bag holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys and values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// A single occurrence of a destination on the back stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackStackEntry {
    /// Unique entry id.
    pub id: EntryId,
    /// Leaf destination this entry displays.
    pub destination_id: DestinationId,
    /// Creation sequence number, strictly increasing per back stack.
    pub sequence: u64,
    /// Graph the navigation named when it resolved to this leaf, if any.
    pub entered_via: Option<DestinationId>,
    /// UI state bag.
    pub saved_state: SavedState,
    /// When the entry was pushed.
    pub created_at: DateTime<Utc>,
}

impl BackStackEntry {
    /// Create a new entry with a fresh id and an empty bag.
    pub fn new(destination_id: DestinationId, sequence: u64) -> Self {
        Self {
            id: EntryId::generate(),
            destination_id,
            sequence,
            entered_via: None,
            saved_state: SavedState::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach the graph id this entry was entered through.
    pub fn with_entered_via(mut self, graph_id: Option<DestinationId>) -> Self {
        self.entered_via = graph_id;
        self
    }

    /// Attach a state bag.
    pub fn with_saved_state(mut self, saved_state: SavedState) -> Self {
        self.saved_state = saved_state;
        self
    }
}
