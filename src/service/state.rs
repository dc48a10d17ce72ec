//! Shared service state.
//!
//! One controller per service process. The tab coordinator, when tabs are
//! configured, wraps the same controller.

use std::sync::Arc;

use crate::config::{ConfigError, NavigatorConfig};
use crate::controller::NavController;
use crate::tabs::TabCoordinator;

/// Shared service state.
#[derive(Debug, Clone)]
pub struct ServiceState {
    /// The navigation controller.
    pub controller: Arc<NavController>,
    /// Tab coordinator over `controller`, if tabs are configured.
    pub tabs: Option<Arc<TabCoordinator>>,
}

impl ServiceState {
    /// Wrap an existing controller.
    pub fn new(controller: Arc<NavController>) -> Self {
        let tabs = TabCoordinator::from_controller(controller.clone())
            .ok()
            .map(Arc::new);
        Self { controller, tabs }
    }

    /// Validate a configuration and build the service state from it.
    pub fn from_config(config: &NavigatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build_controller()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_state_has_tabs() {
        let state = ServiceState::from_config(&NavigatorConfig::demo().unwrap()).unwrap();
        let tabs = state.tabs.as_ref().unwrap();
        assert_eq!(tabs.tabs().len(), 3);
        assert!(Arc::ptr_eq(tabs.controller(), &state.controller));
    }

    #[test]
    fn test_no_tabs_without_tab_set() {
        let mut config = NavigatorConfig::demo().unwrap();
        config.tabs.clear();
        let state = ServiceState::from_config(&config).unwrap();
        assert!(state.tabs.is_none());
    }
}
