//! In-memory saved-state store.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use super::SavedStateStore;
use crate::types::{DestinationId, SavedState};

/// Configuration for the saved-state table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedStateConfig {
    /// Maximum number of bags kept. The least recently saved bag is evicted
    /// first. Controllers raise this to the graph's destination count, so a
    /// bag is only evicted by a store built directly with a smaller limit.
    pub max_entries: usize,
    /// Whether popped state is kept at all.
    pub enabled: bool,
}

impl Default for SavedStateConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            enabled: true,
        }
    }
}

impl SavedStateConfig {
    /// Raise `max_entries` to hold one bag per destination.
    ///
    /// Bags are keyed by destination id, so a table this large never evicts.
    pub fn covering(mut self, destinations: usize) -> Self {
        self.max_entries = self.max_entries.max(destinations);
        self
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedStateStats {
    /// Current number of stored bags.
    pub len: usize,
    /// Maximum capacity.
    pub cap: usize,
}

/// LRU-bounded saved-state table.
///
/// With `enabled: false` every save is dropped and every restore misses.
#[derive(Debug)]
pub struct InMemorySavedStateStore {
    cache: Option<LruCache<DestinationId, SavedState>>,
}

impl InMemorySavedStateStore {
    /// Create a store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&SavedStateConfig::default())
    }

    /// Create a store with a custom configuration.
    pub fn with_config(config: &SavedStateConfig) -> Self {
        let cache = if config.enabled {
            let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
            Some(LruCache::new(size))
        } else {
            None
        };
        Self { cache }
    }

    /// Get store statistics. `None` if the store is disabled.
    pub fn stats(&self) -> Option<SavedStateStats> {
        self.cache.as_ref().map(|cache| SavedStateStats {
            len: cache.len(),
            cap: cache.cap().get(),
        })
    }
}

impl Default for InMemorySavedStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedStateStore for InMemorySavedStateStore {
    fn save(&mut self, id: DestinationId, state: SavedState) {
        if let Some(cache) = &mut self.cache {
            cache.put(id, state);
        }
    }

    fn take(&mut self, id: &DestinationId) -> Option<SavedState> {
        self.cache.as_mut().and_then(|cache| cache.pop(id))
    }

    fn peek(&self, id: &DestinationId) -> Option<&SavedState> {
        self.cache.as_ref().and_then(|cache| cache.peek(id))
    }

    fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    fn clear(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }
}
