//! Receiver tests: axum handler called directly, no sockets.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::{
    body::to_bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde_json::{json, Value};

use ceprism_gateway::{
    app_state::AppState,
    config,
    ops::{self, Readiness},
    transport::http::receive,
};

const CONFIG: &str = r#"
version: 1
policy:
  type_allowlist: ["com.example.*", "dev.ceprism.ping"]
  source_allowlist: ["/orders*", "/client"]
routes:
  - type: "dev.ceprism.ping"
    handler: echo
"#;

fn state() -> AppState {
    AppState::new(config::load_from_str(CONFIG).unwrap()).unwrap()
}

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in pairs {
        map.insert(*k, HeaderValue::from_static(v));
    }
    map
}

async fn body_json(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn binary_event_is_accepted() {
    let st = state();
    let res = receive(
        State(st.clone()),
        headers(&[
            ("ce-specversion", "1.0"),
            ("ce-id", "1"),
            ("ce-type", "com.example.order.created"),
            ("ce-source", "/orders"),
            ("content-type", "application/json"),
        ]),
        Bytes::from_static(br#"{"total":42}"#),
    )
    .await;

    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(
        st.metrics()
            .events_accepted
            .get(&[("mode", "binary"), ("version", "1.0")]),
        1
    );
}

#[tokio::test]
async fn structured_event_is_accepted() {
    let st = state();
    let body = json!({
        "specversion": "0.3", "id": "1", "type": "com.example.x", "source": "/orders/7",
        "data": {"k": "v"}
    });
    let res = receive(
        State(st.clone()),
        headers(&[("content-type", "application/cloudevents+json; charset=utf-8")]),
        Bytes::from(body.to_string()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(
        st.metrics()
            .events_accepted
            .get(&[("mode", "structured"), ("version", "0.3")]),
        1
    );
}

#[tokio::test]
async fn validation_failure_is_400_with_code() {
    let res = receive(
        State(state()),
        headers(&[
            ("ce-specversion", "0.3"),
            ("ce-id", "1"),
            ("ce-source", "/orders"),
            ("content-type", "application/json"),
        ]),
        Bytes::from_static(b"{}"),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["message"], "header 'ce-type' not found");
}

#[tokio::test]
async fn non_event_request_is_rejected() {
    let st = state();
    let res = receive(
        State(st.clone()),
        headers(&[("content-type", "application/json")]),
        Bytes::from_static(b"{}"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "UNRECOGNIZED_MODE");
    assert_eq!(
        st.metrics().events_rejected.get(&[("code", "UNRECOGNIZED_MODE")]),
        1
    );
}

#[tokio::test]
async fn policy_rejects_unknown_type_and_source() {
    let st = state();
    let res = receive(
        State(st.clone()),
        headers(&[
            ("ce-specversion", "1.0"),
            ("ce-id", "1"),
            ("ce-type", "org.other.thing"),
            ("ce-source", "/orders"),
        ]),
        Bytes::new(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(res).await["error"], "NOT_ALLOWED");

    let res = receive(
        State(st.clone()),
        headers(&[
            ("ce-specversion", "1.0"),
            ("ce-id", "2"),
            ("ce-type", "com.example.x"),
            ("ce-source", "/billing"),
        ]),
        Bytes::new(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(st.metrics().policy_decisions.get(&[("decision", "reject")]), 2);
}

#[tokio::test]
async fn echo_route_replies_in_binary_mode() {
    let res = receive(
        State(state()),
        headers(&[
            ("ce-specversion", "1.0"),
            ("ce-id", "ping-1"),
            ("ce-type", "dev.ceprism.ping"),
            ("ce-source", "/client"),
            ("content-type", "application/json"),
        ]),
        Bytes::from_static(br#"{"n":1}"#),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let h = res.headers();
    assert_eq!(h.get("ce-type").unwrap(), "dev.ceprism.ping");
    assert_eq!(h.get("ce-source").unwrap(), "/ceprism-gateway");
    assert_eq!(h.get("ce-specversion").unwrap(), "1.0");
    assert_ne!(h.get("ce-id").unwrap(), "ping-1");
    assert_eq!(body_json(res).await, json!({"n": 1}));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let st = state();
    let big = vec![b' '; st.cfg().gateway.max_body_bytes + 1];
    let res = receive(
        State(st),
        headers(&[
            ("ce-specversion", "1.0"),
            ("ce-id", "1"),
            ("ce-type", "com.example.x"),
            ("ce-source", "/orders"),
        ]),
        Bytes::from(big),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn metrics_and_readiness() {
    let st = state();
    let (content_type, text) = ops::metrics(State(st.clone())).await;
    assert!(content_type[0].1.starts_with("text/plain; version=0.0.4"));
    assert!(text.contains("ceprism_bindings_registered 8"));
    assert!(text.contains("ceprism_draining 0"));

    assert_eq!(ops::readyz(State(st.clone())).await, (StatusCode::OK, "ready"));
    st.set_draining();
    assert_eq!(Readiness::of(&st), Readiness::Draining);
    assert_eq!(
        ops::readyz(State(st)).await,
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    );
}
