//! Lateral tab-bar navigation.
//!
//! Switching tabs pops back to the graph's root start destination, saves
//! the state of whatever was popped, and restores the chosen tab's saved
//! state. A tab that is already current is never pushed twice.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::controller::{NavController, NavigationError};
use crate::graph::RouteGraph;
use crate::store::{InMemorySavedStateStore, SavedStateConfig, SavedStateStore};
use crate::types::{DestinationId, NavOptions, Transition};

/// Error type for tab operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabError {
    /// Tab id not declared in the graph, or not part of the tab set.
    #[error("Unknown tab: {0}")]
    UnknownTab(DestinationId),
    /// Same tab listed twice.
    #[error("Duplicate tab: {0}")]
    DuplicateTab(DestinationId),
    /// No tabs declared.
    #[error("Tab set is empty")]
    Empty,
    /// The underlying navigation failed.
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

/// Validated, ordered set of tab destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSet {
    tabs: Vec<DestinationId>,
}

impl TabSet {
    /// Validate tab ids against `graph`, keeping declaration order.
    pub fn new<I, T>(graph: &RouteGraph, ids: I) -> Result<Self, TabError>
    where
        I: IntoIterator<Item = T>,
        T: Into<DestinationId>,
    {
        let mut seen = BTreeSet::new();
        let mut tabs = Vec::new();
        for id in ids {
            let id = id.into();
            if !graph.contains(&id) {
                return Err(TabError::UnknownTab(id));
            }
            if !seen.insert(id.clone()) {
                return Err(TabError::DuplicateTab(id));
            }
            tabs.push(id);
        }
        if tabs.is_empty() {
            return Err(TabError::Empty);
        }
        Ok(Self { tabs })
    }

    /// Tab selected while `current` is displayed.
    ///
    /// An exact match wins. Otherwise a tab naming a graph is selected
    /// while `current` lies inside that graph.
    pub fn tab_for<'a>(&'a self, graph: &RouteGraph, current: &DestinationId) -> Option<&'a DestinationId> {
        self.tabs.iter().find(|tab| *tab == current).or_else(|| {
            self.tabs
                .iter()
                .find(|tab| graph.is_graph(tab) && graph.is_within(current, tab))
        })
    }

    /// Check if `id` is one of the tabs.
    pub fn contains(&self, id: &DestinationId) -> bool {
        self.tabs.contains(id)
    }

    /// Tabs in declaration order.
    pub fn as_slice(&self) -> &[DestinationId] {
        &self.tabs
    }

    /// Number of tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

/// Tab-switch policy over a [`NavController`].
#[derive(Debug)]
pub struct TabCoordinator<S: SavedStateStore = InMemorySavedStateStore> {
    controller: Arc<NavController<S>>,
}

impl TabCoordinator<InMemorySavedStateStore> {
    /// Coordinator over a fresh controller with the default store.
    pub fn in_memory<I, T>(graph: Arc<RouteGraph>, tabs: I) -> Result<Self, TabError>
    where
        I: IntoIterator<Item = T>,
        T: Into<DestinationId>,
    {
        let store =
            InMemorySavedStateStore::with_config(&SavedStateConfig::default().covering(graph.len()));
        Self::new(graph, store, tabs)
    }
}

impl<S: SavedStateStore> TabCoordinator<S> {
    /// Validate `tabs` and build a controller that reports them.
    pub fn new<I, T>(graph: Arc<RouteGraph>, store: S, tabs: I) -> Result<Self, TabError>
    where
        I: IntoIterator<Item = T>,
        T: Into<DestinationId>,
    {
        let tabs = TabSet::new(&graph, tabs)?;
        Ok(Self {
            controller: Arc::new(NavController::with_tabs(graph, store, tabs)),
        })
    }

    /// Wrap a controller that was built with a tab set.
    ///
    /// Fails with [`TabError::Empty`] if it was built without one.
    pub fn from_controller(controller: Arc<NavController<S>>) -> Result<Self, TabError> {
        if controller.tabs().is_none() {
            return Err(TabError::Empty);
        }
        Ok(Self { controller })
    }

    /// Underlying controller, for non-tab intents.
    pub fn controller(&self) -> &Arc<NavController<S>> {
        &self.controller
    }

    /// Tabs in declaration order.
    pub fn tabs(&self) -> &[DestinationId] {
        self.controller.tabs().map(TabSet::as_slice).unwrap_or_default()
    }

    /// Switch to `tab_id`.
    pub fn select_tab(&self, tab_id: &DestinationId) -> Result<Transition, TabError> {
        let tabs = self
            .controller
            .tabs()
            .ok_or_else(|| TabError::UnknownTab(tab_id.clone()))?;
        if !tabs.contains(tab_id) {
            return Err(TabError::UnknownTab(tab_id.clone()));
        }

        let root_start = self.controller.graph().root_start().clone();
        let transition = self
            .controller
            .navigate(tab_id, &NavOptions::tab_switch(root_start))?;

        debug!(
            target: "navstack::tabs",
            tab = %tab_id,
            transition = ?transition.kind,
            depth = transition.state.back_stack_depth,
            "tab selected"
        );
        Ok(transition)
    }

    /// Tab selected for the current destination, `None` when the user has
    /// navigated away from every tab.
    pub fn current_tab(&self) -> Option<DestinationId> {
        self.controller.state().current_tab_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDeclaration;
    use crate::types::TransitionKind;

    fn id(s: &str) -> DestinationId {
        DestinationId::new(s)
    }

    fn make_graph() -> Arc<RouteGraph> {
        let decl = GraphDeclaration::new()
            .root("root", "home")
            .leaf("home", "root")
            .leaf("profile", "root")
            .leaf("search", "root")
            .leaf("details", "root")
            .graph("settings_root", "root", "general_settings")
            .leaf("general_settings", "settings_root")
            .leaf("account_settings", "settings_root");
        Arc::new(RouteGraph::new(decl).unwrap())
    }

    fn make_coordinator() -> TabCoordinator {
        TabCoordinator::in_memory(make_graph(), ["home", "profile", "search"]).unwrap()
    }

    #[test]
    fn test_tab_set_validation() {
        let graph = make_graph();
        assert_eq!(
            TabSet::new(&graph, ["home", "ghost"]).unwrap_err(),
            TabError::UnknownTab(id("ghost"))
        );
        assert_eq!(
            TabSet::new(&graph, ["home", "home"]).unwrap_err(),
            TabError::DuplicateTab(id("home"))
        );
        assert_eq!(
            TabSet::new(&graph, Vec::<&str>::new()).unwrap_err(),
            TabError::Empty
        );
    }

    #[test]
    fn test_tabs_keep_declaration_order() {
        let coordinator = make_coordinator();
        assert_eq!(coordinator.tabs(), &[id("home"), id("profile"), id("search")]);
        assert_eq!(coordinator.current_tab(), Some(id("home")));
    }

    #[test]
    fn test_select_tab_keeps_stack_shallow() {
        let coordinator = make_coordinator();
        coordinator.select_tab(&id("profile")).unwrap();
        assert_eq!(coordinator.current_tab(), Some(id("profile")));
        assert_eq!(coordinator.controller().state().back_stack_depth, 2);

        coordinator.select_tab(&id("search")).unwrap();
        assert_eq!(coordinator.current_tab(), Some(id("search")));
        assert_eq!(coordinator.controller().state().back_stack_depth, 2);
    }

    #[test]
    fn test_reselect_current_tab_is_noop() {
        let coordinator = make_coordinator();
        coordinator.select_tab(&id("profile")).unwrap();
        let t = coordinator.select_tab(&id("profile")).unwrap();
        assert_eq!(t.kind, TransitionKind::Unchanged);
    }

    #[test]
    fn test_select_start_tab_reuses_root_entry() {
        let coordinator = make_coordinator();
        coordinator.select_tab(&id("search")).unwrap();
        let t = coordinator.select_tab(&id("home")).unwrap();
        assert_eq!(t.kind, TransitionKind::ReusedTop);
        assert_eq!(t.state.back_stack_depth, 1);
    }

    #[test]
    fn test_tab_state_restored() {
        let coordinator = make_coordinator();
        let controller = coordinator.controller();

        coordinator.select_tab(&id("profile")).unwrap();
        controller
            .update_current_state(|bag| {
                bag.insert("scroll", 420);
            })
            .unwrap();

        coordinator.select_tab(&id("search")).unwrap();
        assert!(controller.saved_state_for(&id("profile")).is_some());

        let t = coordinator.select_tab(&id("profile")).unwrap();
        assert_eq!(t.current.saved_state.get("scroll"), Some(&serde_json::json!(420)));
    }

    #[test]
    fn test_no_tab_outside_tab_bar() {
        let coordinator = make_coordinator();
        coordinator
            .controller()
            .navigate(&id("details"), &NavOptions::new())
            .unwrap();
        assert_eq!(coordinator.current_tab(), None);
    }

    #[test]
    fn test_graph_tab_selected_inside_graph() {
        let coordinator =
            TabCoordinator::in_memory(make_graph(), ["home", "settings_root"]).unwrap();
        coordinator.select_tab(&id("settings_root")).unwrap();
        assert_eq!(coordinator.current_tab(), Some(id("settings_root")));

        coordinator
            .controller()
            .navigate(&id("account_settings"), &NavOptions::new())
            .unwrap();
        assert_eq!(coordinator.current_tab(), Some(id("settings_root")));
    }

    #[test]
    fn test_select_unknown_tab() {
        let coordinator = make_coordinator();
        assert_eq!(
            coordinator.select_tab(&id("details")).unwrap_err(),
            TabError::UnknownTab(id("details"))
        );
    }

    #[test]
    fn test_from_controller_requires_tabs() {
        let controller = Arc::new(NavController::in_memory(make_graph()));
        assert_eq!(
            TabCoordinator::from_controller(controller).unwrap_err(),
            TabError::Empty
        );
    }

    #[test]
    fn test_navigation_error_surfaces() {
        let coordinator = make_coordinator();
        coordinator.controller().teardown();
        assert_eq!(
            coordinator.select_tab(&id("profile")).unwrap_err(),
            TabError::Navigation(NavigationError::EmptyStack)
        );
    }
}
