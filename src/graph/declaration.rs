//! Static graph declarations.
//!
//! A declaration is the plain, serializable form of a route graph: a map
//! from destination id to its parent graph, start destination (graphs only)
//! and display title. It carries no guarantees until it has been validated
//! into a [`RouteGraph`](super::RouteGraph).
//!
//! ```json
//! {
//!   "destinations": {
//!     "root":          { "start_destination_id": "home" },
//!     "home":          { "parent_graph_id": "root", "display_title": "Home" },
//!     "settings_root": { "parent_graph_id": "root", "start_destination_id": "general_settings" },
//!     "general_settings": { "parent_graph_id": "settings_root" }
//!   }
//! }
//! ```

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::DestinationId;

/// Declaration of a single destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationDecl {
    /// Owning graph. Exactly one declaration (the root graph) omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_graph_id: Option<DestinationId>,
    /// Present only on graphs: the child entered by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_destination_id: Option<DestinationId>,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
}

impl DestinationDecl {
    /// Declare a leaf owned by `parent`.
    pub fn leaf(parent: impl Into<DestinationId>) -> Self {
        Self {
            parent_graph_id: Some(parent.into()),
            ..Self::default()
        }
    }

    /// Declare a graph. `parent` is `None` for the root graph.
    pub fn graph(parent: Option<DestinationId>, start: impl Into<DestinationId>) -> Self {
        Self {
            parent_graph_id: parent,
            start_destination_id: Some(start.into()),
            display_title: None,
        }
    }

    /// Attach a display title.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.display_title = Some(title.into());
        self
    }

    /// Check if this declares a graph.
    pub fn is_graph(&self) -> bool {
        self.start_destination_id.is_some()
    }
}

/// Full graph declaration, keyed by destination id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDeclaration")]
pub struct GraphDeclaration {
    /// All declared destinations, nested graphs included.
    pub destinations: BTreeMap<DestinationId, DestinationDecl>,
    /// Ids declared more than once, by the builder or as repeated JSON keys.
    #[serde(skip)]
    pub(crate) duplicates: Vec<DestinationId>,
}

#[derive(Deserialize)]
struct RawDeclaration {
    destinations: DeclaredDestinations,
}

impl From<RawDeclaration> for GraphDeclaration {
    fn from(raw: RawDeclaration) -> Self {
        Self {
            destinations: raw.destinations.entries,
            duplicates: raw.destinations.duplicates,
        }
    }
}

/// Destination map that keeps repeated keys instead of letting the last one win.
struct DeclaredDestinations {
    entries: BTreeMap<DestinationId, DestinationDecl>,
    duplicates: Vec<DestinationId>,
}

impl<'de> Deserialize<'de> for DeclaredDestinations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DestinationsVisitor;

        impl<'de> Visitor<'de> for DestinationsVisitor {
            type Value = DeclaredDestinations;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of destination id to declaration")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = BTreeMap::new();
                let mut duplicates = Vec::new();
                while let Some((id, decl)) = map.next_entry::<DestinationId, DestinationDecl>()? {
                    if entries.contains_key(&id) {
                        duplicates.push(id.clone());
                    }
                    entries.insert(id, decl);
                }
                Ok(DeclaredDestinations {
                    entries,
                    duplicates,
                })
            }
        }

        deserializer.deserialize_map(DestinationsVisitor)
    }
}

impl GraphDeclaration {
    /// Create an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add a declaration. Re-declaring an id is recorded and rejected at
    /// validation time.
    pub fn insert(&mut self, id: impl Into<DestinationId>, decl: DestinationDecl) -> &mut Self {
        let id = id.into();
        if self.destinations.contains_key(&id) {
            self.duplicates.push(id.clone());
        }
        self.destinations.insert(id, decl);
        self
    }

    /// Declare the root graph.
    pub fn root(mut self, id: impl Into<DestinationId>, start: impl Into<DestinationId>) -> Self {
        self.insert(id, DestinationDecl::graph(None, start));
        self
    }

    /// Declare a nested graph.
    pub fn graph(
        mut self,
        id: impl Into<DestinationId>,
        parent: impl Into<DestinationId>,
        start: impl Into<DestinationId>,
    ) -> Self {
        self.insert(id, DestinationDecl::graph(Some(parent.into()), start));
        self
    }

    /// Declare a leaf.
    pub fn leaf(mut self, id: impl Into<DestinationId>, parent: impl Into<DestinationId>) -> Self {
        self.insert(id, DestinationDecl::leaf(parent));
        self
    }

    /// Declare a leaf with a display title.
    pub fn titled_leaf(
        mut self,
        id: impl Into<DestinationId>,
        parent: impl Into<DestinationId>,
        title: impl Into<String>,
    ) -> Self {
        self.insert(id, DestinationDecl::leaf(parent).titled(title));
        self
    }

    /// Number of declared destinations.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Check if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_duplicates() {
        let decl = GraphDeclaration::new()
            .root("root", "home")
            .leaf("home", "root")
            .leaf("home", "root");

        assert_eq!(decl.len(), 2);
        assert_eq!(decl.duplicates, vec![DestinationId::new("home")]);
    }

    #[test]
    fn test_json_round_shape() {
        let decl = GraphDeclaration::from_json_str(
            r#"{
                "destinations": {
                    "root": { "start_destination_id": "home" },
                    "home": { "parent_graph_id": "root", "display_title": "Home" }
                }
            }"#,
        )
        .unwrap();

        let root = &decl.destinations[&DestinationId::new("root")];
        assert!(root.is_graph());
        assert!(root.parent_graph_id.is_none());

        let home = &decl.destinations[&DestinationId::new("home")];
        assert!(!home.is_graph());
        assert_eq!(home.display_title.as_deref(), Some("Home"));
        assert!(decl.duplicates.is_empty());
    }

    #[test]
    fn test_json_records_repeated_keys() {
        let decl = GraphDeclaration::from_json_str(
            r#"{
                "destinations": {
                    "root": { "start_destination_id": "home" },
                    "home": { "parent_graph_id": "root" },
                    "home": { "parent_graph_id": "root", "display_title": "Second" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(decl.len(), 2);
        assert_eq!(decl.duplicates, vec![DestinationId::new("home")]);
    }
}
