//! Core types for the navigation controller.

pub mod destination;
pub mod entry;
pub mod options;
pub mod state;

pub use destination::{Destination, DestinationId, DestinationKind};
pub use entry::{BackStackEntry, EntryId, SavedState};
pub use options::{NavOptions, NavigationIntent, PopUpTo};
pub use state::{NavigationState, Transition, TransitionKind};
