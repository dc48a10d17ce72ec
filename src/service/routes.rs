//! Axum routes for the navigation service.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::controller::NavigationError;
use crate::tabs::TabError;
use crate::types::{
    BackStackEntry, Destination, DestinationId, EntryId, NavigationIntent, NavigationState,
    Transition, TransitionKind,
};
use crate::NAVSTACK_SCHEMA_VERSION;

use super::middleware::{record_rejection, record_transition};
use super::state::ServiceState;

/// Type alias for the shared service state.
pub type AppState = ServiceState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to switch tabs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTabRequest {
    /// Tab to select.
    pub tab_id: DestinationId,
}

/// Result of a processed intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResponse {
    /// What the intent did.
    pub kind: TransitionKind,
    /// Destinations popped, top first.
    pub removed: Vec<DestinationId>,
    /// Top entry after the intent.
    pub current: BackStackEntry,
    /// Published state after the intent.
    pub state: NavigationState,
}

impl From<Transition> for TransitionResponse {
    fn from(transition: Transition) -> Self {
        Self {
            kind: transition.kind,
            removed: transition
                .removed
                .into_iter()
                .map(|e| e.destination_id)
                .collect(),
            current: transition.current,
            state: (*transition.state).clone(),
        }
    }
}

/// Full back stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackStackResponse {
    /// Entries, oldest first.
    pub entries: Vec<BackStackEntry>,
    /// Fingerprint of the last published stack.
    pub stack_fingerprint: String,
    /// Bags held in the saved-state table.
    pub saved_state_count: usize,
}

/// Destination lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationResponse {
    /// The destination.
    pub destination: Destination,
    /// Enclosing graphs, outermost first.
    pub ancestors: Vec<DestinationId>,
    /// Leaf pushed when navigating here.
    pub start_leaf: DestinationId,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub graph_fingerprint: String,
    pub destination_count: usize,
    pub tab_count: usize,
    pub back_stack_depth: usize,
    pub state_version: u64,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Status and code for a navigation failure.
fn navigation_status(err: &NavigationError) -> (StatusCode, &'static str) {
    match err {
        NavigationError::NotFound(_) => (StatusCode::NOT_FOUND, "DESTINATION_NOT_FOUND"),
        NavigationError::TargetNotOnStack(_) => (StatusCode::CONFLICT, "TARGET_NOT_ON_STACK"),
        NavigationError::RootNotEvictable => (StatusCode::CONFLICT, "ROOT_NOT_EVICTABLE"),
        NavigationError::EmptyStack => (StatusCode::SERVICE_UNAVAILABLE, "EMPTY_STACK"),
        NavigationError::Graph(_) => (StatusCode::INTERNAL_SERVER_ERROR, "GRAPH_ERROR"),
    }
}

fn navigation_error(intent: &str, err: NavigationError) -> HandlerError {
    let (status, code) = navigation_status(&err);
    record_rejection(intent, code);
    (status, Json(ErrorResponse::new(code, err.to_string())))
}

fn tab_error(err: TabError) -> HandlerError {
    match err {
        TabError::Navigation(err) => navigation_error("select_tab", err),
        other => {
            record_rejection("select_tab", "UNKNOWN_TAB");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("UNKNOWN_TAB", other.to_string())),
            )
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Process a navigation intent.
async fn intent_handler(
    State(state): State<Arc<AppState>>,
    Json(intent): Json<NavigationIntent>,
) -> Result<Json<TransitionResponse>, HandlerError> {
    let transition = state
        .controller
        .dispatch(&intent)
        .map_err(|err| navigation_error(intent.kind(), err))?;

    record_transition(intent.kind(), transition.kind, transition.state.back_stack_depth);
    Ok(Json(transition.into()))
}

/// Switch tabs.
async fn select_tab_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectTabRequest>,
) -> Result<Json<TransitionResponse>, HandlerError> {
    let tabs = state.tabs.as_ref().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("NO_TABS", "No tab bar is configured")),
        )
    })?;

    let transition = tabs.select_tab(&request.tab_id).map_err(tab_error)?;

    record_transition("select_tab", transition.kind, transition.state.back_stack_depth);
    Ok(Json(transition.into()))
}

/// Latest published state.
async fn state_handler(State(state): State<Arc<AppState>>) -> Json<NavigationState> {
    Json((*state.controller.state()).clone())
}

/// Full back stack, oldest first.
async fn back_stack_handler(State(state): State<Arc<AppState>>) -> Json<BackStackResponse> {
    Json(BackStackResponse {
        entries: state.controller.back_stack(),
        stack_fingerprint: state.controller.state().stack_fingerprint(),
        saved_state_count: state.controller.saved_state_count(),
    })
}

/// Look up one entry on the stack by entry id.
async fn entry_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<BackStackEntry>, HandlerError> {
    let entry_id = uuid::Uuid::parse_str(&raw_id).map(EntryId::new).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new("INVALID_ENTRY_ID", format!("Invalid entry id: {}", e))
                    .with_details(raw_id.clone()),
            ),
        )
    })?;

    state
        .controller
        .back_stack()
        .into_iter()
        .find(|e| e.id == entry_id)
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "ENTRY_NOT_ON_STACK",
                    format!("Entry not on back stack: {}", entry_id),
                )),
            )
        })
}

/// Describe a declared destination.
async fn destination_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<DestinationResponse>, HandlerError> {
    let id = DestinationId::new(raw_id);
    let graph = state.controller.graph();
    let lookup = graph.resolve(&id).and_then(|destination| {
        Ok(DestinationResponse {
            destination: destination.clone(),
            ancestors: graph.ancestors_of(&id)?,
            start_leaf: graph.start_of(&id)?,
        })
    });

    lookup
        .map(Json)
        .map_err(|err| navigation_error("describe", err.into()))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let published = state.controller.state();
    let torn_down = state.controller.is_torn_down();

    Json(HealthResponse {
        status: if torn_down { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: NAVSTACK_SCHEMA_VERSION.to_string(),
        graph_fingerprint: state.controller.graph().fingerprint().to_string(),
        destination_count: state.controller.graph().len(),
        tab_count: state.tabs.as_ref().map_or(0, |t| t.tabs().len()),
        back_stack_depth: published.back_stack_depth,
        state_version: published.version,
    })
}

/// Liveness probe endpoint.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the navigation service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Intents
        .route("/api/intent", post(intent_handler))
        .route("/api/tabs/select", post(select_tab_handler))
        // Reads
        .route("/api/state", get(state_handler))
        .route("/api/back_stack", get(back_stack_handler))
        .route("/api/entries/:entry_id", get(entry_handler))
        .route("/api/destinations/:id", get(destination_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigatorConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_state() -> Arc<AppState> {
        let config = NavigatorConfig::demo().unwrap();
        Arc::new(ServiceState::from_config(&config).unwrap())
    }

    async fn post_intent(state: &Arc<AppState>, intent: NavigationIntent) -> TransitionResponse {
        intent_handler(State(state.clone()), Json(intent))
            .await
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn test_intent_handler_pushes() {
        let state = make_state();
        let response = post_intent(&state, NavigationIntent::navigate("linear_b")).await;

        assert_eq!(response.kind, TransitionKind::Pushed);
        assert_eq!(response.state.back_stack, vec![DestinationId::new("linear_a"), DestinationId::new("linear_b")]);
    }

    #[tokio::test]
    async fn test_intent_handler_maps_errors() {
        let state = make_state();

        let (status, Json(body)) = intent_handler(
            State(state.clone()),
            Json(NavigationIntent::navigate("nowhere")),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "DESTINATION_NOT_FOUND");

        let (status, Json(body)) = intent_handler(
            State(state.clone()),
            Json(NavigationIntent::pop_to("dashboard", false)),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "TARGET_NOT_ON_STACK");
    }

    #[tokio::test]
    async fn test_select_tab_handler() {
        let state = make_state();
        let Json(response) = select_tab_handler(
            State(state.clone()),
            Json(SelectTabRequest {
                tab_id: DestinationId::new("profile"),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.state.current_tab_id, Some(DestinationId::new("profile")));

        let (status, Json(body)) = select_tab_handler(
            State(state),
            Json(SelectTabRequest {
                tab_id: DestinationId::new("dashboard"),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "UNKNOWN_TAB");
    }

    #[tokio::test]
    async fn test_destination_handler() {
        let state = make_state();
        let Json(response) =
            destination_handler(State(state.clone()), Path("settings_root".to_string()))
                .await
                .unwrap();
        assert!(response.destination.is_graph());
        assert_eq!(response.start_leaf, "general_settings");
        assert_eq!(response.ancestors, vec![DestinationId::new("root")]);

        let (status, _) = destination_handler(State(state), Path("ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_entry_handler() {
        let state = make_state();
        let pushed = post_intent(&state, NavigationIntent::navigate("dashboard")).await;

        let Json(entry) = entry_handler(State(state.clone()), Path(pushed.current.id.to_string()))
            .await
            .unwrap();
        assert_eq!(entry.destination_id, "dashboard");

        let (status, _) = entry_handler(State(state), Path("not-a-uuid".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_back_stack_and_health() {
        let state = make_state();
        post_intent(&state, NavigationIntent::navigate("linear_b")).await;

        let Json(stack) = back_stack_handler(State(state.clone())).await;
        assert_eq!(stack.entries.len(), 2);
        assert_eq!(stack.stack_fingerprint, state.controller.state().stack_fingerprint());

        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.tab_count, 3);
        assert_eq!(health.state_version, 1);
    }

    #[tokio::test]
    async fn test_router_serves_state() {
        let config = NavigatorConfig::demo().unwrap();
        let app = create_router(ServiceState::from_config(&config).unwrap());

        let response = app
            .oneshot(Request::builder().uri("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_accepts_intent_json() {
        let config = NavigatorConfig::demo().unwrap();
        let app = create_router(ServiceState::from_config(&config).unwrap());

        let request = Request::builder()
            .method("POST")
            .uri("/api/intent")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"kind": "navigate", "target_id": "settings_root"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
