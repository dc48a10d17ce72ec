//! Navigator configuration.
//!
//! One JSON document declares the route graph, the tab bar and the
//! saved-state table limits. See `demos/app_graph.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::controller::NavController;
use crate::graph::{GraphDeclaration, GraphError, RouteGraph};
use crate::store::{InMemorySavedStateStore, SavedStateConfig};
use crate::tabs::{TabError, TabSet};
use crate::types::DestinationId;

/// Bundled sample configuration.
pub const DEMO_CONFIG_JSON: &str = include_str!("../demos/app_graph.json");

/// Error type for loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Malformed JSON.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Graph declaration failed validation.
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
    /// Tab list failed validation.
    #[error("Invalid tabs: {0}")]
    Tabs(#[from] TabError),
}

/// Full navigator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Route graph declaration.
    pub graph: GraphDeclaration,
    /// Tab bar destinations, in display order. Empty for no tab bar.
    #[serde(default)]
    pub tabs: Vec<DestinationId>,
    /// Saved-state table limits.
    #[serde(default)]
    pub saved_state: SavedStateConfig,
}

impl NavigatorConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The bundled sample app: a linear flow, a settings sub-graph and a
    /// three-tab bar.
    pub fn demo() -> Result<Self, ConfigError> {
        Self::from_json_str(DEMO_CONFIG_JSON)
    }

    /// Validate the graph declaration.
    pub fn build_graph(&self) -> Result<Arc<RouteGraph>, ConfigError> {
        Ok(Arc::new(RouteGraph::new(self.graph.clone())?))
    }

    /// Validate everything and build a controller.
    ///
    /// The controller reports the selected tab when tabs are configured.
    pub fn build_controller(&self) -> Result<Arc<NavController>, ConfigError> {
        let graph = self.build_graph()?;
        let saved_state = self.saved_state.clone().covering(graph.len());
        let store = InMemorySavedStateStore::with_config(&saved_state);
        let controller = if self.tabs.is_empty() {
            NavController::new(graph, store)
        } else {
            let tabs = TabSet::new(&graph, self.tabs.iter().cloned())?;
            NavController::with_tabs(graph, store, tabs)
        };

        info!(
            target: "navstack::config",
            destinations = self.graph.len(),
            tabs = self.tabs.len(),
            saved_state_enabled = self.saved_state.enabled,
            saved_state_max = saved_state.max_entries,
            "navigator configured"
        );
        Ok(Arc::new(controller))
    }
}
