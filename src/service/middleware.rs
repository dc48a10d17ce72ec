//! Service middleware for request metrics.
//!
//! Metrics are emitted as structured `tracing` events under the
//! `navstack::metrics` target and aggregated from logs.

use axum::{extract::Request, middleware::Next, response::Response};
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

use crate::types::TransitionKind;

/// Record request count and latency by normalized path, method and status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    info!(
        target: "navstack::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request_metric"
    );

    response
}

/// Collapse dynamic path segments so metrics keep a bounded cardinality.
fn normalize_path(path: &str) -> String {
    static DESTINATION: OnceLock<Regex> = OnceLock::new();
    static UUID: OnceLock<Regex> = OnceLock::new();

    let destination = DESTINATION.get_or_init(|| {
        Regex::new(r"^/api/destinations/[^/]+").expect("destination path pattern compiles")
    });
    let uuid = UUID.get_or_init(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("uuid pattern compiles")
    });

    let path = destination.replace(path, "/api/destinations/:id");
    uuid.replace_all(&path, ":id").into_owned()
}

/// Record the outcome of one processed intent.
pub fn record_transition(intent: &str, kind: TransitionKind, depth: usize) {
    info!(
        target: "navstack::metrics",
        metric_type = "transition",
        intent = intent,
        transition = ?kind,
        depth = depth,
        "transition_metric"
    );
}

/// Record a rejected intent by error code.
pub fn record_rejection(intent: &str, code: &str) {
    info!(
        target: "navstack::metrics",
        metric_type = "rejection",
        intent = intent,
        code = code,
        "rejection_metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_destination_path() {
        assert_eq!(
            normalize_path("/api/destinations/account_settings"),
            "/api/destinations/:id"
        );
    }

    #[test]
    fn test_normalize_uuid_segment() {
        assert_eq!(
            normalize_path("/api/entries/550e8400-e29b-41d4-a716-446655440000"),
            "/api/entries/:id"
        );
    }

    #[test]
    fn test_normalize_preserves_static_paths() {
        assert_eq!(normalize_path("/health/live"), "/health/live");
        assert_eq!(normalize_path("/api/back_stack"), "/api/back_stack");
    }
}
