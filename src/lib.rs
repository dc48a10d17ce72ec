//! # navstack
//!
//! Back-stack navigation for nested destination graphs.
//!
//! Given a declared graph of destinations (with nested sub-graphs) and a
//! sequence of navigation intents, the controller maintains an ordered back
//! stack of visited destinations and publishes the current destination,
//! the stack depth and the selected tab after every change.
//!
//! ## Architecture
//!
//! ```text
//! Intent → NavController → RouteGraph (resolve, start leaf, ancestors)
//!               ↓
//!          BackStack (+ SavedStateStore) → NavigationState → observers
//!               ↑
//!          TabCoordinator (lateral tab-switch policy)
//! ```
//!
//! ## Guarantees
//!
//! - The back stack is never empty between construction and teardown
//! - Every entry on the stack names a declared leaf destination
//! - A failed intent leaves the stack and the saved-state table untouched
//! - No-op intents publish nothing
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use navstack::{GraphDeclaration, NavController, NavOptions, RouteGraph};
//!
//! let graph = GraphDeclaration::new()
//!     .root("root", "home")
//!     .leaf("home", "root")
//!     .leaf("details", "root");
//! let graph = Arc::new(RouteGraph::new(graph).unwrap());
//!
//! let controller = NavController::in_memory(graph);
//! controller.navigate(&"details".into(), &NavOptions::new()).unwrap();
//! assert_eq!(controller.state().back_stack_depth, 2);
//!
//! controller.back().unwrap();
//! assert_eq!(controller.state().current_destination_id, "home");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod store;
pub mod backstack;
pub mod controller;
pub mod tabs;
pub mod config;
pub mod canonical;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    BackStackEntry, Destination, DestinationId, DestinationKind, EntryId, NavOptions,
    NavigationIntent, NavigationState, PopUpTo, SavedState, Transition, TransitionKind,
};
pub use graph::{
    DestinationDecl, GraphDeclaration, GraphError, InvalidGraph, ResolvedTarget, RouteGraph,
    DESTINATION_ID_PATTERN,
};
pub use store::{InMemorySavedStateStore, SavedStateConfig, SavedStateStats, SavedStateStore};
pub use backstack::{BackStack, BackStackError};
pub use controller::{NavController, NavigationError, NavigationObserver, ObserverId};
pub use tabs::{TabCoordinator, TabError, TabSet};
pub use config::{ConfigError, NavigatorConfig, DEMO_CONFIG_JSON};

/// Schema version for published navigation state.
pub const NAVSTACK_SCHEMA_VERSION: &str = "1.0.0";
