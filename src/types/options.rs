//! Navigation options and intents.

use serde::{Deserialize, Serialize};

use super::destination::DestinationId;

/// Pop the back stack down to a destination before pushing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopUpTo {
    /// Destination to pop down to. A graph id is resolved to its start leaf.
    pub target_id: DestinationId,
    /// Also remove the matching entry.
    #[serde(default)]
    pub inclusive: bool,
}

impl PopUpTo {
    /// Create a pop target.
    pub fn new(target_id: impl Into<DestinationId>, inclusive: bool) -> Self {
        Self {
            target_id: target_id.into(),
            inclusive,
        }
    }
}

/// Options controlling how a `navigate` intent mutates the back stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavOptions {
    /// Pop down to this target before pushing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop_up_to: Option<PopUpTo>,
    /// Do not push a duplicate of the current top destination.
    #[serde(default)]
    pub launch_single_top: bool,
    /// Reattach a previously saved state bag to the pushed entry.
    #[serde(default)]
    pub restore_state: bool,
    /// Keep the state bags of entries removed by `pop_up_to`.
    #[serde(default)]
    pub save_state: bool,
}

impl NavOptions {
    /// Plain push with no stack manipulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pop target.
    pub fn pop_up_to(mut self, target_id: impl Into<DestinationId>, inclusive: bool) -> Self {
        self.pop_up_to = Some(PopUpTo::new(target_id, inclusive));
        self
    }

    /// Set single-top deduplication.
    pub fn launch_single_top(mut self, enabled: bool) -> Self {
        self.launch_single_top = enabled;
        self
    }

    /// Set state restoration.
    pub fn restore_state(mut self, enabled: bool) -> Self {
        self.restore_state = enabled;
        self
    }

    /// Set state saving for popped entries.
    pub fn save_state(mut self, enabled: bool) -> Self {
        self.save_state = enabled;
        self
    }

    /// Lateral tab-switch policy: pop to `root_start_id`, save what was
    /// popped, never duplicate the top, restore the tab's saved bag.
    pub fn tab_switch(root_start_id: impl Into<DestinationId>) -> Self {
        Self::new()
            .pop_up_to(root_start_id, false)
            .save_state(true)
            .launch_single_top(true)
            .restore_state(true)
    }
}

/// Navigation intent raised by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationIntent {
    /// Push a destination, optionally manipulating the stack first.
    Navigate {
        /// Destination or graph to navigate to.
        target_id: DestinationId,
        /// Stack options.
        #[serde(default)]
        options: NavOptions,
    },
    /// Go to the start of the enclosing graph, or back one entry at top level.
    NavigateUp,
    /// Pop to a target, or pop one entry when no target is given.
    PopBackStack {
        /// Destination to pop down to.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<DestinationId>,
        /// Also remove the matching entry.
        #[serde(default)]
        inclusive: bool,
    },
}

impl NavigationIntent {
    /// Navigate with default options.
    pub fn navigate(target_id: impl Into<DestinationId>) -> Self {
        Self::Navigate {
            target_id: target_id.into(),
            options: NavOptions::default(),
        }
    }

    /// Navigate with explicit options.
    pub fn navigate_with(target_id: impl Into<DestinationId>, options: NavOptions) -> Self {
        Self::Navigate {
            target_id: target_id.into(),
            options,
        }
    }

    /// Pop down to a target.
    pub fn pop_to(target_id: impl Into<DestinationId>, inclusive: bool) -> Self {
        Self::PopBackStack {
            target_id: Some(target_id.into()),
            inclusive,
        }
    }

    /// Classic back: pop one entry.
    pub fn back() -> Self {
        Self::PopBackStack {
            target_id: None,
            inclusive: false,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::NavigateUp => "navigate_up",
            Self::PopBackStack { .. } => "pop_back_stack",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_switch_options() {
        let opts = NavOptions::tab_switch("linear_a");
        assert_eq!(opts.pop_up_to, Some(PopUpTo::new("linear_a", false)));
        assert!(opts.save_state);
        assert!(opts.launch_single_top);
        assert!(opts.restore_state);
    }

    #[test]
    fn test_intent_wire_format() {
        let intent: NavigationIntent = serde_json::from_value(serde_json::json!({
            "kind": "navigate",
            "target_id": "profile",
            "options": {
                "pop_up_to": {"target_id": "home"},
                "save_state": true
            }
        }))
        .unwrap();

        match intent {
            NavigationIntent::Navigate { target_id, options } => {
                assert_eq!(target_id, "profile");
                assert_eq!(options.pop_up_to, Some(PopUpTo::new("home", false)));
                assert!(options.save_state);
                assert!(!options.restore_state);
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[test]
    fn test_intent_without_payload() {
        let up: NavigationIntent =
            serde_json::from_value(serde_json::json!({"kind": "navigate_up"})).unwrap();
        assert_eq!(up, NavigationIntent::NavigateUp);

        let back: NavigationIntent =
            serde_json::from_value(serde_json::json!({"kind": "pop_back_stack"})).unwrap();
        assert_eq!(back, NavigationIntent::back());
    }

    #[test]
    fn test_navigate_defaults_options() {
        let intent: NavigationIntent =
            serde_json::from_value(serde_json::json!({"kind": "navigate", "target_id": "b"}))
                .unwrap();
        assert_eq!(intent, NavigationIntent::navigate("b"));
    }
}
