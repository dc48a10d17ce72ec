//! Navigation REST Service
//!
//! Exposes one navigation controller as a JSON API.
//!
//! ## Endpoints
//!
//! - `POST /api/intent` - Process a navigation intent
//! - `POST /api/tabs/select` - Switch tabs
//! - `GET /api/state` - Latest published state
//! - `GET /api/back_stack` - Full back stack
//! - `GET /api/entries/:entry_id` - One entry on the stack
//! - `GET /api/destinations/:id` - Describe a declared destination
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_rejection, record_transition};
pub use routes::{create_router, AppState, ErrorResponse};
pub use state::ServiceState;
