//! Axum router wiring.
//!
//! Mounts the event receiver on `gateway.path` plus the ops endpoints.

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let path = state.cfg().gateway.path.clone();
    let limit = state.cfg().gateway.max_body_bytes;

    Router::new()
        .route(&path, post(transport::http::receive))
        .layer(DefaultBodyLimit::max(limit))
        .merge(ops::routes())
        .with_state(state)
}
