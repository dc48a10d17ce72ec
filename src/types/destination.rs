//! Destination types for the route graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a destination in the route graph.
///
/// Wraps the declared string key and implements `Ord` so indexes built from
/// it iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(String);

impl DestinationId {
    /// Create a new DestinationId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DestinationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DestinationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DestinationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DestinationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DestinationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Whether a destination is a screen or a graph of screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DestinationKind {
    /// A navigable screen. Only leaves are ever pushed on the back stack.
    Leaf,
    /// A group of child destinations entered through its start destination.
    Graph {
        /// Child entered when the graph itself is navigated to.
        start_destination_id: DestinationId,
        /// Direct children, sorted.
        children: Vec<DestinationId>,
    },
}

/// Immutable descriptor of a declared destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Unique id across the whole graph, nested graphs included.
    pub id: DestinationId,
    /// Graph that owns this destination. `None` only for the root graph.
    pub parent_graph_id: Option<DestinationId>,
    /// Optional human-readable title (tab labels, app bar).
    pub display_title: Option<String>,
    /// Leaf or graph.
    pub kind: DestinationKind,
}

impl Destination {
    /// Check if this destination is a graph.
    pub fn is_graph(&self) -> bool {
        matches!(self.kind, DestinationKind::Graph { .. })
    }

    /// Declared start destination, if this is a graph.
    pub fn start_destination_id(&self) -> Option<&DestinationId> {
        match &self.kind {
            DestinationKind::Graph { start_destination_id, .. } => Some(start_destination_id),
            DestinationKind::Leaf => None,
        }
    }

    /// Direct children. Empty for leaves.
    pub fn children(&self) -> &[DestinationId] {
        match &self.kind {
            DestinationKind::Graph { children, .. } => children,
            DestinationKind::Leaf => &[],
        }
    }

    /// Title to show for this destination, falling back to the id.
    pub fn label(&self) -> &str {
        self.display_title.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_id_ordering() {
        let a = DestinationId::new("account_settings");
        let b = DestinationId::new("dashboard");
        assert!(a < b);
    }

    #[test]
    fn test_destination_id_serializes_as_plain_string() {
        let id = DestinationId::new("home");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"home\"");
        let back: DestinationId = serde_json::from_str("\"home\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let untitled = Destination {
            id: DestinationId::new("settings_root"),
            parent_graph_id: Some(DestinationId::new("root")),
            display_title: None,
            kind: DestinationKind::Leaf,
        };
        assert_eq!(untitled.label(), "settings_root");

        let titled = Destination {
            display_title: Some("Home".to_string()),
            ..untitled
        };
        assert_eq!(titled.label(), "Home");
    }
}
