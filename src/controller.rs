//! Navigation controller: the back-stack state machine.
//!
//! Every intent runs under one mutex that guards the back stack and the
//! saved-state table, and every check runs before the first mutation, so a
//! failed intent leaves the stack exactly as it was. The published
//! [`NavigationState`] sits behind its own lock and is swapped while the
//! intent still holds the mutex; readers never wait on an intent in
//! progress. Observers are notified after the mutex is released.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backstack::{BackStack, BackStackError};
use crate::graph::{GraphError, RouteGraph};
use crate::store::{InMemorySavedStateStore, SavedStateConfig, SavedStateStore};
use crate::tabs::TabSet;
use crate::types::{
    BackStackEntry, DestinationId, NavOptions, NavigationIntent, NavigationState, SavedState,
    Transition, TransitionKind,
};

/// Error type for navigation intents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Target or pop target is not declared in the graph.
    #[error("Destination not found: {0}")]
    NotFound(DestinationId),
    /// Pop target does not appear on the back stack.
    #[error("Target not on back stack: {0}")]
    TargetNotOnStack(DestinationId),
    /// Pop would leave the back stack empty.
    #[error("Root entry cannot be evicted")]
    RootNotEvictable,
    /// The controller has been torn down.
    #[error("Back stack is empty")]
    EmptyStack,
    /// Any other graph failure. Indicates a broken graph, not a bad intent.
    #[error("Graph error: {0}")]
    Graph(GraphError),
}

impl From<GraphError> for NavigationError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(id) => Self::NotFound(id),
            other => Self::Graph(other),
        }
    }
}

impl NavigationError {
    /// Map a back stack failure for a pop aimed at `target`.
    pub fn from_stack(err: BackStackError, target: &DestinationId) -> Self {
        match err {
            BackStackError::TargetNotOnStack => Self::TargetNotOnStack(target.clone()),
            BackStackError::RootNotEvictable => Self::RootNotEvictable,
            BackStackError::EmptyStack => Self::EmptyStack,
        }
    }
}

/// Receives every newly published state.
///
/// Called outside the controller's lock, so an observer may read the
/// controller or raise further intents. Under concurrent intents two
/// notifications may arrive out of order; compare `version` to discard
/// stale ones.
pub trait NavigationObserver: Send + Sync {
    /// Handle a published state.
    fn on_navigation(&self, state: &NavigationState);
}

impl<F> NavigationObserver for F
where
    F: Fn(&NavigationState) + Send + Sync,
{
    fn on_navigation(&self, state: &NavigationState) {
        self(state)
    }
}

/// Handle returned by [`NavController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

struct Core<S: SavedStateStore> {
    stack: BackStack<S>,
    version: u64,
}

impl<S: SavedStateStore> Core<S> {
    fn top(&self) -> Result<&BackStackEntry, NavigationError> {
        self.stack.current().map_err(|_| NavigationError::EmptyStack)
    }
}

/// Back-stack navigation controller over a validated [`RouteGraph`].
pub struct NavController<S: SavedStateStore = InMemorySavedStateStore> {
    graph: Arc<RouteGraph>,
    tabs: Option<TabSet>,
    core: Mutex<Core<S>>,
    published: RwLock<Arc<NavigationState>>,
    observers: RwLock<Vec<(ObserverId, Arc<dyn NavigationObserver>)>>,
    next_observer: AtomicU64,
}

impl NavController<InMemorySavedStateStore> {
    /// Controller with the default in-memory saved-state table.
    pub fn in_memory(graph: Arc<RouteGraph>) -> Self {
        let store =
            InMemorySavedStateStore::with_config(&SavedStateConfig::default().covering(graph.len()));
        Self::new(graph, store)
    }
}

impl<S: SavedStateStore> NavController<S> {
    /// Create a controller positioned on the graph's root start leaf.
    pub fn new(graph: Arc<RouteGraph>, store: S) -> Self {
        Self::build(graph, store, None)
    }

    /// Create a controller that reports the selected tab in its state.
    pub fn with_tabs(graph: Arc<RouteGraph>, store: S, tabs: TabSet) -> Self {
        Self::build(graph, store, Some(tabs))
    }

    fn build(graph: Arc<RouteGraph>, store: S, tabs: Option<TabSet>) -> Self {
        let start = graph.root_start().clone();
        let root = BackStackEntry::new(start.clone(), 0);
        let current_tab = tabs.as_ref().and_then(|t| t.tab_for(&graph, &start)).cloned();
        let initial = Arc::new(NavigationState::initial(&root, current_tab));
        let stack = BackStack::with_root(root, store);

        info!(
            target: "navstack::controller",
            start = %start,
            graph = %graph.fingerprint(),
            tabs = tabs.as_ref().map_or(0, TabSet::len),
            "navigation controller started"
        );

        Self {
            graph,
            tabs,
            core: Mutex::new(Core { stack, version: 0 }),
            published: RwLock::new(initial),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(0),
        }
    }

    /// Graph this controller navigates.
    pub fn graph(&self) -> &Arc<RouteGraph> {
        &self.graph
    }

    /// Tab set, if the controller was built with one.
    pub fn tabs(&self) -> Option<&TabSet> {
        self.tabs.as_ref()
    }

    /// Latest published state. Never blocks on an intent in progress.
    ///
    /// After [`teardown`](Self::teardown) this keeps returning the last
    /// state published before it.
    pub fn state(&self) -> Arc<NavigationState> {
        self.published.read().clone()
    }

    /// Copy of the top entry.
    pub fn current_entry(&self) -> Result<BackStackEntry, NavigationError> {
        self.core.lock().top().cloned()
    }

    /// Copy of the whole stack, oldest first.
    pub fn back_stack(&self) -> Vec<BackStackEntry> {
        self.core.lock().stack.entries().to_vec()
    }

    /// Bag currently saved for `id`, without consuming it.
    pub fn saved_state_for(&self, id: &DestinationId) -> Option<SavedState> {
        self.core.lock().stack.peek_saved_state(id).cloned()
    }

    /// Number of bags in the saved-state table.
    pub fn saved_state_count(&self) -> usize {
        self.core.lock().stack.saved_states().len()
    }

    /// Check if the controller has been torn down.
    pub fn is_torn_down(&self) -> bool {
        self.core.lock().stack.is_empty()
    }

    /// Mutate the current entry's state bag. Nothing is published.
    pub fn update_current_state<F>(&self, update: F) -> Result<(), NavigationError>
    where
        F: FnOnce(&mut SavedState),
    {
        let mut core = self.core.lock();
        let entry = core
            .stack
            .current_mut()
            .map_err(|_| NavigationError::EmptyStack)?;
        update(&mut entry.saved_state);
        Ok(())
    }

    /// Register an observer for future publishes.
    pub fn subscribe<O>(&self, observer: O) -> ObserverId
    where
        O: NavigationObserver + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Process any intent.
    pub fn dispatch(&self, intent: &NavigationIntent) -> Result<Transition, NavigationError> {
        match intent {
            NavigationIntent::Navigate { target_id, options } => self.navigate(target_id, options),
            NavigationIntent::NavigateUp => self.navigate_up(),
            NavigationIntent::PopBackStack { target_id, inclusive } => {
                self.pop_back_stack(target_id.as_ref(), *inclusive)
            }
        }
    }

    /// Navigate to a destination or graph.
    ///
    /// A graph is replaced by the leaf reached through its start
    /// destinations. A `pop_up_to` target naming a graph pops to that
    /// graph's start leaf.
    pub fn navigate(
        &self,
        target_id: &DestinationId,
        options: &NavOptions,
    ) -> Result<Transition, NavigationError> {
        self.run_navigate(target_id, options)
            .map_err(|err| self.rejected("navigate", err))
    }

    fn run_navigate(
        &self,
        target_id: &DestinationId,
        options: &NavOptions,
    ) -> Result<Transition, NavigationError> {
        let target = self.graph.resolve_target(target_id)?;
        let pop_leaf = match &options.pop_up_to {
            Some(pop) => Some((self.graph.start_of(&pop.target_id)?, pop)),
            None => None,
        };

        let mut core = self.core.lock();
        let top = core.top()?;

        if options.launch_single_top && top.destination_id == target.leaf {
            let current = top.clone();
            drop(core);
            debug!(
                target: "navstack::controller",
                destination = %target.leaf,
                "single-top target already current"
            );
            return Ok(self.unchanged(current));
        }

        let keep = match &pop_leaf {
            Some((leaf, pop)) => Some(
                core.stack
                    .pop_plan(|e| &e.destination_id == leaf, pop.inclusive)
                    .map_err(|err| NavigationError::from_stack(err, &pop.target_id))?,
            ),
            None => None,
        };

        // Validation done; mutate.
        let removed = match keep {
            Some(keep) => core.stack.truncate(keep),
            None => Vec::new(),
        };
        if options.save_state && !removed.is_empty() {
            core.stack.save_state(&removed);
        }

        let reuse_top = options.launch_single_top
            && core
                .stack
                .current()
                .is_ok_and(|e| e.destination_id == target.leaf);

        let kind = if reuse_top {
            TransitionKind::ReusedTop
        } else {
            let bag = if options.restore_state {
                core.stack.restore_state(&target.leaf).unwrap_or_default()
            } else {
                SavedState::default()
            };
            let entry = BackStackEntry::new(target.leaf.clone(), 0)
                .with_entered_via(target.via_graph.clone())
                .with_saved_state(bag);
            core.stack.push(entry);
            TransitionKind::Pushed
        };

        self.publish(core, kind, removed)
    }

    /// Go to the start of the current destination's enclosing graph.
    ///
    /// At top level, or when already on that start, this pops one entry;
    /// at the stack root it does nothing. A start that is not on the stack
    /// fails with [`NavigationError::TargetNotOnStack`].
    pub fn navigate_up(&self) -> Result<Transition, NavigationError> {
        self.run_navigate_up()
            .map_err(|err| self.rejected("navigate_up", err))
    }

    fn run_navigate_up(&self) -> Result<Transition, NavigationError> {
        let mut core = self.core.lock();
        let current = core.top()?.destination_id.clone();

        let up_target = match self.graph.parent_of(&current) {
            Some(parent) if parent != self.graph.root_id() => {
                let start = self.graph.start_of(parent)?;
                (start != current).then_some(start)
            }
            _ => None,
        };

        let removed = match up_target {
            Some(start) => {
                let keep = core
                    .stack
                    .pop_plan(|e| e.destination_id == start, false)
                    .map_err(|err| NavigationError::from_stack(err, &start))?;
                core.stack.truncate(keep)
            }
            None => core.stack.pop().into_iter().collect(),
        };

        if removed.is_empty() {
            let top = core.top()?.clone();
            drop(core);
            return Ok(self.unchanged(top));
        }
        self.publish(core, TransitionKind::Popped, removed)
    }

    /// Pop to `target_id`, or pop one entry when no target is given.
    ///
    /// With no target this is a no-op at the stack root. A target that is
    /// not on the stack, or a pop that would empty it, is an error.
    pub fn pop_back_stack(
        &self,
        target_id: Option<&DestinationId>,
        inclusive: bool,
    ) -> Result<Transition, NavigationError> {
        self.run_pop_back_stack(target_id, inclusive)
            .map_err(|err| self.rejected("pop_back_stack", err))
    }

    fn run_pop_back_stack(
        &self,
        target_id: Option<&DestinationId>,
        inclusive: bool,
    ) -> Result<Transition, NavigationError> {
        let leaf = target_id.map(|id| self.graph.start_of(id)).transpose()?;

        let mut core = self.core.lock();
        core.top()?;

        let removed = match (target_id, &leaf) {
            (Some(target), Some(leaf)) => core
                .stack
                .pop_to(|e| &e.destination_id == leaf, inclusive)
                .map_err(|err| NavigationError::from_stack(err, target))?,
            _ => core.stack.pop().into_iter().collect(),
        };

        if removed.is_empty() {
            let top = core.top()?.clone();
            drop(core);
            return Ok(self.unchanged(top));
        }
        self.publish(core, TransitionKind::Popped, removed)
    }

    /// Classic back: pop one entry, no-op at the root.
    pub fn back(&self) -> Result<Transition, NavigationError> {
        self.pop_back_stack(None, false)
    }

    /// Drain the stack and drop all saved state.
    ///
    /// Every later intent fails with [`NavigationError::EmptyStack`].
    pub fn teardown(&self) -> Vec<BackStackEntry> {
        let drained = self.core.lock().stack.clear();
        info!(
            target: "navstack::controller",
            entries = drained.len(),
            "navigation controller torn down"
        );
        drained
    }

    /// Swap in a new published state, release the lock, notify observers.
    fn publish(
        &self,
        mut core: parking_lot::MutexGuard<'_, Core<S>>,
        kind: TransitionKind,
        removed: Vec<BackStackEntry>,
    ) -> Result<Transition, NavigationError> {
        let current = core.top()?.clone();
        let tab = self
            .tabs
            .as_ref()
            .and_then(|t| t.tab_for(&self.graph, &current.destination_id))
            .cloned();
        let version = core.version + 1;
        let state = NavigationState::from_entries(core.stack.entries(), tab, version)
            .map(Arc::new)
            .ok_or(NavigationError::EmptyStack)?;
        core.version = version;
        *self.published.write() = state.clone();
        drop(core);

        debug!(
            target: "navstack::controller",
            transition = ?kind,
            destination = %state.current_destination_id,
            depth = state.back_stack_depth,
            removed = removed.len(),
            version,
            "navigation state published"
        );

        let observers: Vec<Arc<dyn NavigationObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        for observer in observers {
            observer.on_navigation(&state);
        }

        Ok(Transition {
            kind,
            removed,
            current,
            state,
        })
    }

    fn unchanged(&self, current: BackStackEntry) -> Transition {
        Transition {
            kind: TransitionKind::Unchanged,
            removed: Vec::new(),
            current,
            state: self.state(),
        }
    }

    fn rejected(&self, intent: &'static str, err: NavigationError) -> NavigationError {
        warn!(
            target: "navstack::controller",
            intent,
            error = %err,
            "navigation intent rejected"
        );
        err
    }
}

impl<S: SavedStateStore> std::fmt::Debug for NavController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("NavController")
            .field("graph", &self.graph.fingerprint())
            .field("current", &state.current_destination_id)
            .field("depth", &state.back_stack_depth)
            .field("version", &state.version)
            .finish()
    }
}
