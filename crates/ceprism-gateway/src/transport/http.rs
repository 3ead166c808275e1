//! HTTP receiver: one POST per event.
//!
//! Pipeline: size check -> `Dispatcher::accept` -> policy -> handler ->
//! optional binary-mode reply. `handle_request` is transport-free so the
//! loopback emitter can drive it without sockets.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use ceprism_core::binding::{self, Mode};
use ceprism_core::error::{CeError, Result};
use ceprism_core::{Dispatcher, Headers, Message};

use crate::app_state::AppState;
use crate::dispatch::Reply;
use crate::error::HttpError;
use crate::policy::PolicyDecision;

use super::codec;

struct InFlight<'a>(&'a AppState);

impl<'a> InFlight<'a> {
    fn enter(state: &'a AppState) -> Self {
        state.metrics().requests_in_flight.inc(&[]);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.metrics().requests_in_flight.dec(&[]);
    }
}

/// Receive one request. `Ok(None)` means accepted without a reply body.
pub async fn handle_request(state: &AppState, headers: &Headers, body: Bytes) -> Result<Option<Message>> {
    let _guard = InFlight::enter(state);

    let res = process(state, headers, body).await;
    if let Err(e) = &res {
        state
            .metrics()
            .events_rejected
            .inc(&[("code", e.client_code().as_str())]);
        tracing::warn!(code = e.client_code().as_str(), error = %e, details = ?e.details(), "event rejected");
    }
    res
}

async fn process(state: &AppState, headers: &Headers, body: Bytes) -> Result<Option<Message>> {
    let max = state.cfg().gateway.max_body_bytes;
    if body.len() > max {
        return Err(CeError::Argument(format!(
            "body of {} bytes exceeds max_body_bytes={max}",
            body.len()
        )));
    }

    let event = state.dispatcher().accept(headers, &codec::payload_from(body))?;
    let mode = Dispatcher::resolve_mode(headers).map(Mode::as_str).unwrap_or("unknown");
    state.metrics().events_accepted.inc(&[
        ("mode", mode),
        ("version", event.spec_version().as_str()),
    ]);

    match state.policy().evaluate(&event) {
        PolicyDecision::Pass => {
            state.metrics().policy_decisions.inc(&[("decision", "pass")]);
        }
        PolicyDecision::Reject { msg } => {
            state.metrics().policy_decisions.inc(&[("decision", "reject")]);
            return Err(CeError::NotAllowed(format!("{msg}: {}", event.ty())));
        }
    }

    let kind = state.handlers().resolve(event.ty());
    let started = Instant::now();
    let reply = state.handlers().dispatch(event).await;
    state
        .metrics()
        .handler_duration
        .observe(&[("handler", kind.as_str())], started.elapsed());

    match reply {
        Ok(Reply::Ack) => Ok(None),
        Ok(Reply::Event(ev)) => {
            let msg = binding::serialize(Mode::Binary, &ev)?;
            state.metrics().events_emitted.inc(&[("mode", Mode::Binary.as_str())]);
            Ok(Some(msg))
        }
        Err(e) => {
            state.metrics().handler_errors.inc(&[("handler", kind.as_str())]);
            Err(e)
        }
    }
}

pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let headers = codec::headers_from(&headers);
    let res = handle_request(&state, &headers, body)
        .await
        .and_then(|reply| match reply {
            None => Ok(StatusCode::ACCEPTED.into_response()),
            Some(msg) => codec::message_response(StatusCode::OK, msg),
        });
    match res {
        Ok(r) => r,
        Err(e) => HttpError(e).into_response(),
    }
}
