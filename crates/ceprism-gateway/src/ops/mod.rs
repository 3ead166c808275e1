//! Operational endpoints mounted next to the event receiver.
//!
//! Readiness goes false once shutdown starts draining the receiver.

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    routing::get,
    Router,
};

use crate::app_state::AppState;

pub const HEALTHZ: &str = "/healthz";
pub const READYZ: &str = "/readyz";
pub const METRICS: &str = "/metrics";

/// Paths the receiver may not be mounted on.
pub const PATHS: [&str; 3] = [HEALTHZ, READYZ, METRICS];

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Draining,
}

impl Readiness {
    pub fn of(state: &AppState) -> Self {
        if state.is_draining() {
            Readiness::Draining
        } else {
            Readiness::Ready
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::Draining => "draining",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            Readiness::Ready => StatusCode::OK,
            Readiness::Draining => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Ops sub-router; merged into the main router before state is attached.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(HEALTHZ, get(healthz))
        .route(READYZ, get(readyz))
        .route(METRICS, get(metrics))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let readiness = Readiness::of(&state);
    if readiness != Readiness::Ready {
        tracing::debug!(reason = readiness.as_str(), "receiver not ready");
    }
    (readiness.status(), readiness.as_str())
}

pub async fn metrics(State(state): State<AppState>) -> ([(HeaderName, &'static str); 1], String) {
    let text = state.metrics().render(&state.metrics_extra());
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], text)
}
