//! Route graph: the validated, read-only index of declared destinations.
//!
//! ## Invariants
//!
//! Enforced once by [`RouteGraph::new`]; a graph that fails any of them is
//! never constructed.
//!
//! - Every id is unique and well-formed
//! - Exactly one root, and it is a graph
//! - Every parent exists and is a graph
//! - Every graph's start destination is one of its direct children
//! - No destination is its own ancestor
//! - Every graph resolves to a leaf by following start destinations

pub mod declaration;

pub use declaration::{DestinationDecl, GraphDeclaration};

use regex_lite::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::info;

use crate::canonical::canonical_hash_hex;
use crate::types::{Destination, DestinationId, DestinationKind};

/// Accepted shape for destination ids.
pub const DESTINATION_ID_PATTERN: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DESTINATION_ID_PATTERN).expect("destination id pattern compiles"))
}

/// Error type for graph construction and lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Unknown destination id.
    #[error("Destination not found: {0}")]
    NotFound(DestinationId),
    /// Following ancestors or start destinations never terminates.
    #[error("Cyclic graph at {id}: no leaf or root reached within {depth} levels")]
    Cyclic {
        /// Where resolution started.
        id: DestinationId,
        /// Depth bound that was exceeded.
        depth: usize,
    },
    /// Static declaration defect.
    #[error("Invalid graph declaration: {0}")]
    Invalid(#[from] InvalidGraph),
}

/// Declaration defects detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGraph {
    /// Same id declared twice.
    #[error("duplicate destination id {0}")]
    DuplicateId(DestinationId),
    /// Id does not match [`DESTINATION_ID_PATTERN`].
    #[error("malformed destination id {0:?}")]
    MalformedId(String),
    /// Every declaration names a parent.
    #[error("no root graph declared")]
    MissingRoot,
    /// More than one declaration omits its parent.
    #[error("multiple root graphs declared: {0:?}")]
    MultipleRoots(Vec<DestinationId>),
    /// The root has no start destination.
    #[error("root {0} is not a graph")]
    RootNotGraph(DestinationId),
    /// Parent id is not declared.
    #[error("{id} names unknown parent {parent}")]
    UnknownParent {
        /// Child.
        id: DestinationId,
        /// Missing parent.
        parent: DestinationId,
    },
    /// Parent is a leaf.
    #[error("{id} names parent {parent}, which is not a graph")]
    ParentNotGraph {
        /// Child.
        id: DestinationId,
        /// Leaf parent.
        parent: DestinationId,
    },
    /// Graph without children.
    #[error("graph {0} has no children")]
    EmptyGraph(DestinationId),
    /// Start destination is not declared.
    #[error("graph {graph} names unknown start destination {start}")]
    UnknownStart {
        /// Graph.
        graph: DestinationId,
        /// Missing start.
        start: DestinationId,
    },
    /// Start destination belongs to another graph.
    #[error("start destination {start} is not a direct child of graph {graph}")]
    StartNotChild {
        /// Graph.
        graph: DestinationId,
        /// Misplaced start.
        start: DestinationId,
    },
}

/// A navigation target after graph substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Leaf to push.
    pub leaf: DestinationId,
    /// Graph that was named, when the request named a graph.
    pub via_graph: Option<DestinationId>,
}

/// Validated route graph.
///
/// Built once from a [`GraphDeclaration`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    destinations: BTreeMap<DestinationId, Destination>,
    root_id: DestinationId,
    /// Graph id -> leaf reached by following start destinations.
    start_leaves: BTreeMap<DestinationId, DestinationId>,
    /// Bound on start-destination descent (number of graphs).
    max_depth: usize,
    fingerprint: String,
}

impl RouteGraph {
    /// Validate a declaration and build the index.
    pub fn new(declaration: GraphDeclaration) -> Result<Self, GraphError> {
        if let Some(dup) = declaration.duplicates.first() {
            return Err(InvalidGraph::DuplicateId(dup.clone()).into());
        }

        let decls = &declaration.destinations;
        for id in decls.keys() {
            if !id_pattern().is_match(id.as_str()) {
                return Err(InvalidGraph::MalformedId(id.to_string()).into());
            }
        }

        // Root
        let roots: Vec<DestinationId> = decls
            .iter()
            .filter(|(_, d)| d.parent_graph_id.is_none())
            .map(|(id, _)| id.clone())
            .collect();
        let root_id = match roots.as_slice() {
            [] => return Err(InvalidGraph::MissingRoot.into()),
            [only] => only.clone(),
            _ => return Err(InvalidGraph::MultipleRoots(roots).into()),
        };
        if !decls[&root_id].is_graph() {
            return Err(InvalidGraph::RootNotGraph(root_id).into());
        }

        // Parents
        let mut children: BTreeMap<DestinationId, BTreeSet<DestinationId>> = BTreeMap::new();
        for (id, decl) in decls {
            let Some(parent) = &decl.parent_graph_id else {
                continue;
            };
            let parent_decl = decls.get(parent).ok_or_else(|| InvalidGraph::UnknownParent {
                id: id.clone(),
                parent: parent.clone(),
            })?;
            if !parent_decl.is_graph() {
                return Err(InvalidGraph::ParentNotGraph {
                    id: id.clone(),
                    parent: parent.clone(),
                }
                .into());
            }
            children.entry(parent.clone()).or_default().insert(id.clone());
        }

        // Start destinations
        for (id, decl) in decls {
            let Some(start) = &decl.start_destination_id else {
                continue;
            };
            let Some(kids) = children.get(id).filter(|k| !k.is_empty()) else {
                return Err(InvalidGraph::EmptyGraph(id.clone()).into());
            };
            if !decls.contains_key(start) {
                return Err(InvalidGraph::UnknownStart {
                    graph: id.clone(),
                    start: start.clone(),
                }
                .into());
            }
            if !kids.contains(start) {
                return Err(InvalidGraph::StartNotChild {
                    graph: id.clone(),
                    start: start.clone(),
                }
                .into());
            }
        }

        // Ancestor cycles: every parent chain must reach the root.
        let limit = decls.len();
        for id in decls.keys() {
            let mut cursor = id;
            let mut steps = 0;
            while let Some(parent) = decls.get(cursor).and_then(|d| d.parent_graph_id.as_ref()) {
                steps += 1;
                if steps > limit {
                    return Err(GraphError::Cyclic {
                        id: id.clone(),
                        depth: limit,
                    });
                }
                cursor = parent;
            }
        }

        let destinations: BTreeMap<DestinationId, Destination> = decls
            .iter()
            .map(|(id, decl)| {
                let kind = match &decl.start_destination_id {
                    Some(start) => DestinationKind::Graph {
                        start_destination_id: start.clone(),
                        children: children
                            .get(id)
                            .map(|set| set.iter().cloned().collect())
                            .unwrap_or_default(),
                    },
                    None => DestinationKind::Leaf,
                };
                let destination = Destination {
                    id: id.clone(),
                    parent_graph_id: decl.parent_graph_id.clone(),
                    display_title: decl.display_title.clone(),
                    kind,
                };
                (id.clone(), destination)
            })
            .collect();

        let max_depth = destinations.values().filter(|d| d.is_graph()).count();
        let mut start_leaves = BTreeMap::new();
        for graph in destinations.values().filter(|d| d.is_graph()) {
            let leaf = walk_start(&destinations, &graph.id, max_depth)?;
            start_leaves.insert(graph.id.clone(), leaf);
        }

        let fingerprint = canonical_hash_hex(&declaration.destinations);

        info!(
            target: "navstack::graph",
            destinations = destinations.len(),
            graphs = max_depth,
            root = %root_id,
            fingerprint = %fingerprint,
            "route graph validated"
        );

        Ok(Self {
            destinations,
            root_id,
            start_leaves,
            max_depth,
            fingerprint,
        })
    }

    /// Look up a destination.
    pub fn resolve(&self, id: &DestinationId) -> Result<&Destination, GraphError> {
        self.destinations
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    /// Check if a destination is declared.
    pub fn contains(&self, id: &DestinationId) -> bool {
        self.destinations.contains_key(id)
    }

    /// Check if a destination is declared and is a graph.
    pub fn is_graph(&self, id: &DestinationId) -> bool {
        self.destinations.get(id).is_some_and(Destination::is_graph)
    }

    /// Leaf entered when navigating to `id`.
    ///
    /// For a graph, follows start destinations through nested graphs until
    /// a leaf is reached. A leaf resolves to itself.
    pub fn start_of(&self, id: &DestinationId) -> Result<DestinationId, GraphError> {
        let destination = self.resolve(id)?;
        if !destination.is_graph() {
            return Ok(destination.id.clone());
        }
        match self.start_leaves.get(id) {
            Some(leaf) => Ok(leaf.clone()),
            None => walk_start(&self.destinations, id, self.max_depth),
        }
    }

    /// Resolve a navigation target to the leaf that will be pushed.
    pub fn resolve_target(&self, id: &DestinationId) -> Result<ResolvedTarget, GraphError> {
        let leaf = self.start_of(id)?;
        let via_graph = if &leaf != id { Some(id.clone()) } else { None };
        Ok(ResolvedTarget { leaf, via_graph })
    }

    /// Graph ids enclosing `id`, outermost (the root) first.
    pub fn ancestors_of(&self, id: &DestinationId) -> Result<Vec<DestinationId>, GraphError> {
        let mut chain = Vec::new();
        let mut cursor = self.resolve(id)?;
        while let Some(parent) = &cursor.parent_graph_id {
            chain.push(parent.clone());
            cursor = self.resolve(parent)?;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Graph that directly owns `id`. `None` for the root.
    pub fn parent_of(&self, id: &DestinationId) -> Option<&DestinationId> {
        self.destinations
            .get(id)
            .and_then(|d| d.parent_graph_id.as_ref())
    }

    /// Check if `id` is `ancestor` or lies anywhere inside it.
    pub fn is_within(&self, id: &DestinationId, ancestor: &DestinationId) -> bool {
        if id == ancestor {
            return true;
        }
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.parent_of(parent);
        }
        false
    }

    /// Direct children of a graph.
    pub fn children_of(&self, id: &DestinationId) -> Result<&[DestinationId], GraphError> {
        Ok(self.resolve(id)?.children())
    }

    /// Display title of a destination, if declared.
    pub fn display_title(&self, id: &DestinationId) -> Option<&str> {
        self.destinations
            .get(id)
            .and_then(|d| d.display_title.as_deref())
    }

    /// Root graph id.
    pub fn root_id(&self) -> &DestinationId {
        &self.root_id
    }

    /// Leaf the controller starts on.
    pub fn root_start(&self) -> &DestinationId {
        // The root is validated to be a graph, so its leaf is always cached.
        self.start_leaves.get(&self.root_id).unwrap_or(&self.root_id)
    }

    /// Number of declared destinations.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Always false for a validated graph; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Deterministic hash of the declaration this graph was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Follow start destinations from `id` until a leaf, at most `max_depth`
/// descents.
fn walk_start(
    destinations: &BTreeMap<DestinationId, Destination>,
    id: &DestinationId,
    max_depth: usize,
) -> Result<DestinationId, GraphError> {
    let mut current = destinations
        .get(id)
        .ok_or_else(|| GraphError::NotFound(id.clone()))?;

    for _ in 0..=max_depth {
        match &current.kind {
            DestinationKind::Leaf => return Ok(current.id.clone()),
            DestinationKind::Graph { start_destination_id, .. } => {
                current = destinations
                    .get(start_destination_id)
                    .ok_or_else(|| GraphError::NotFound(start_destination_id.clone()))?;
            }
        }
    }

    Err(GraphError::Cyclic {
        id: id.clone(),
        depth: max_depth,
    })
}
