//! Emit-side: serialize an event and hand it to an HTTP client.
//!
//! The client is a collaborator behind [`HttpClient`]. The emitter does no
//! retries and sets no timeout; the client's response comes back unmodified.
//! [`LoopbackClient`] delivers straight into a gateway's receive pipeline.

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;

use ceprism_core::binding::{self, Mode};
use ceprism_core::error::Result;
use ceprism_core::{Event, Headers};

use crate::app_state::AppState;
use crate::error::{error_body, status_for};
use crate::transport::http::handle_request;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Headers,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

/// POSTs one request.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub url: String,
    pub mode: Mode,
    /// Sent alongside the binding's headers; the binding wins on conflict.
    pub headers: Headers,
}

impl EmitOptions {
    /// Binary mode, no extra headers.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: Mode::Binary,
            headers: Headers::new(),
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }
}

pub struct Emitter<C> {
    client: C,
}

impl<C: HttpClient> Emitter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Validate + serialize `event` in `opts.mode`, then send it.
    pub async fn send(&self, event: &Event, opts: &EmitOptions) -> Result<HttpResponse> {
        let msg = binding::serialize(opts.mode, event)?;

        let mut headers: Headers = opts
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        headers.extend(msg.headers);

        tracing::debug!(
            url = %opts.url,
            mode = %opts.mode,
            version = %event.spec_version(),
            id = %event.id(),
            "emitting event"
        );
        self.client
            .send(HttpRequest {
                url: opts.url.clone(),
                headers,
                body: msg.body,
            })
            .await
    }
}

/// In-process client that feeds requests to a gateway's receiver.
#[derive(Clone)]
pub struct LoopbackClient {
    state: AppState,
}

impl LoopbackClient {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

/// Path component of an absolute or relative URL.
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let path = match rest.find('/') {
        Some(i) if url.contains("://") => &rest[i..],
        Some(_) => rest,
        None => "/",
    };
    path.split(['?', '#']).next().unwrap_or(path)
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> HttpResponse {
    let mut headers = Headers::new();
    headers.insert("content-type".into(), "application/json".into());
    HttpResponse {
        status: status.as_u16(),
        headers,
        body: Bytes::from(body.to_string()),
    }
}

#[async_trait]
impl HttpClient for LoopbackClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        if url_path(&req.url) != self.state.cfg().gateway.path {
            return Ok(json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({"error": "NOT_FOUND", "message": req.url}),
            ));
        }

        Ok(match handle_request(&self.state, &req.headers, req.body).await {
            Ok(None) => HttpResponse {
                status: StatusCode::ACCEPTED.as_u16(),
                headers: Headers::new(),
                body: Bytes::new(),
            },
            Ok(Some(msg)) => HttpResponse {
                status: StatusCode::OK.as_u16(),
                headers: msg.headers,
                body: msg.body,
            },
            Err(e) => json_response(status_for(e.client_code()), &error_body(&e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_paths() {
        assert_eq!(url_path("http://localhost:8080/events?x=1"), "/events");
        assert_eq!(url_path("https://host"), "/");
        assert_eq!(url_path("/events"), "/events");
    }
}
