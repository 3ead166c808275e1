//! Emit-then-receive across every spec version and both modes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use chrono::{TimeZone, Utc};
use serde_json::json;

use ceprism_core::binding::{serialize, Binding, BinaryBinding, StructuredBinding};
use ceprism_core::{
    Attribute, CeError, ContentEncoding, Data, Dispatcher, Event, Mode, Payload, SpecVersion,
};

use vector_loader::load;

fn sample(spec: SpecVersion) -> Event {
    let mut b = Event::builder(spec)
        .id("evt-1")
        .source("/orders")
        .ty("com.example.order.created")
        .time(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap())
        .data_content_type("application/json")
        .data(json!({"total": 42}))
        .extension("tenant", "acme");
    if spec == SpecVersion::V10 {
        b = b.data_schema("https://schemas.example.com/order");
    } else {
        b = b.schema_url("https://schemas.example.com/order");
    }
    b.build().unwrap()
}

#[test]
fn every_version_survives_both_modes() {
    let dispatcher = Dispatcher::new();
    for spec in SpecVersion::ALL {
        let original = sample(spec);
        for mode in [Mode::Binary, Mode::Structured] {
            let msg = serialize(mode, &original).unwrap();
            let back = dispatcher
                .accept(&msg.headers, &Payload::from_bytes(msg.body.clone()))
                .unwrap_or_else(|e| panic!("{spec} {mode}: {e}"));

            assert_eq!(back.spec_version(), spec, "{spec} {mode}");
            assert_eq!(back.id(), "evt-1", "{spec} {mode}");
            assert_eq!(back.ty(), original.ty(), "{spec} {mode}");
            assert_eq!(back.time(), original.time(), "{spec} {mode}");
            assert_eq!(back.data(), original.data(), "{spec} {mode}");
            assert_eq!(
                back.extension("tenant").and_then(|e| e.as_str()),
                Some("acme"),
                "{spec} {mode}"
            );
            let schema_attr = if spec == SpecVersion::V10 {
                Attribute::DataSchema
            } else {
                Attribute::SchemaUrl
            };
            assert_eq!(
                back.attribute(schema_attr).map(|a| a.to_wire_string()).as_deref(),
                Some("https://schemas.example.com/order"),
                "{spec} {mode}"
            );
        }
    }
}

#[test]
fn check_is_idempotent() {
    for spec in SpecVersion::ALL {
        let ev = sample(spec);
        assert!(ev.check().is_ok());
        assert!(ev.check().is_ok());
        assert_eq!(ev.format().unwrap(), ev.format().unwrap());
    }
}

#[test]
fn event_without_data_round_trips_in_binary_mode() {
    let mut ev = Event::new(SpecVersion::V10);
    ev.set_source("/s").set_type("t");
    let msg = BinaryBinding::new(SpecVersion::V10).serialize(&ev).unwrap();
    assert!(msg.body.is_empty());

    let back = Dispatcher::new()
        .accept(&msg.headers, &Payload::from_bytes(msg.body))
        .unwrap();
    assert!(back.raw_data().is_none());
}

#[test]
fn version_specific_attributes_are_gated() {
    let err = Event::builder(SpecVersion::V10)
        .schema_url("http://schema.registry/v1")
        .build()
        .unwrap_err();
    assert!(matches!(err, CeError::Attribute(_)));
    assert_eq!(
        err.to_string(),
        "attribute error: cannot set schemaURL on version 1.0 event"
    );

    let err = Event::builder(SpecVersion::V03)
        .data_schema("http://schema.registry/v1")
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "attribute error: cannot set dataSchema on version 0.3 event"
    );
}

#[test]
fn reserved_names_cannot_be_extensions() {
    for spec in SpecVersion::ALL {
        for name in spec.schema().reserved {
            for candidate in [name.to_string(), name.to_ascii_uppercase()] {
                let mut ev = Event::new(spec);
                let err = ev
                    .add_extension(candidate.as_str(), "x")
                    .err()
                    .unwrap_or_else(|| panic!("{spec}: {candidate} accepted"));
                assert_eq!(err.client_code().as_str(), "INVALID_ATTRIBUTE", "{spec} {candidate}");
            }
        }
    }
}

#[test]
fn base64_encoded_v03_event_survives_binary_reemit() {
    let dispatcher = Dispatcher::new();
    let vector = load("binary_v03_base64.json");
    let received = dispatcher.accept(&vector.headers(), &vector.payload()).unwrap();
    assert_eq!(received.data(), Some(Data::Json(json!({"much": "wow"}))));

    let msg = serialize(Mode::Binary, &received).unwrap();
    assert_eq!(
        msg.headers.get("ce-datacontentencoding").map(String::as_str),
        Some("base64")
    );
    let back = dispatcher
        .accept(&msg.headers, &Payload::from_bytes(msg.body))
        .unwrap();
    assert_eq!(back.data(), Some(Data::Json(json!({"much": "wow"}))));
    assert_eq!(back.data_content_encoding().unwrap(), Some(ContentEncoding::Base64));
}

#[test]
fn base64_encoding_wraps_plain_data_on_v03() {
    let mut ev = Event::new(SpecVersion::V03);
    ev.set_source("/s")
        .set_type("t")
        .set_data_content_type("application/json")
        .set_data(json!({"a": 1}));
    ev.set_data_content_encoding(ContentEncoding::Base64).unwrap();

    let msg = serialize(Mode::Binary, &ev).unwrap();
    assert_eq!(&msg.body[..], b"eyJhIjoxfQ==");
    let back = Dispatcher::new()
        .accept(&msg.headers, &Payload::from_bytes(msg.body))
        .unwrap();
    assert_eq!(back.data(), Some(Data::Json(json!({"a": 1}))));
}

#[test]
fn octet_stream_text_survives_v10_binary_mode() {
    let dispatcher = Dispatcher::new();
    for text in ["test", "hello world"] {
        let mut ev = Event::new(SpecVersion::V10);
        ev.set_source("/s")
            .set_type("t")
            .set_data_content_type("application/octet-stream")
            .set_data(text);

        let msg = serialize(Mode::Binary, &ev).unwrap();
        let back = dispatcher
            .accept(&msg.headers, &Payload::from_bytes(msg.body))
            .unwrap();
        assert_eq!(back.data(), Some(Data::String(text.into())), "{text}");
    }
}

#[test]
fn mixed_case_extensions_survive_older_versions() {
    let dispatcher = Dispatcher::new();
    for spec in [SpecVersion::V01, SpecVersion::V02, SpecVersion::V03] {
        let mut ev = Event::new(spec);
        ev.set_source("/s").set_type("t");
        ev.add_extension("traceId", "abc").unwrap();
        assert_eq!(ev.extension("traceId").and_then(|e| e.as_str()), Some("abc"));

        for mode in [Mode::Binary, Mode::Structured] {
            let msg = serialize(mode, &ev).unwrap();
            let back = dispatcher
                .accept(&msg.headers, &Payload::from_bytes(msg.body))
                .unwrap();
            assert_eq!(back.extensions(), ev.extensions(), "{spec} {mode}");
            assert_eq!(
                back.extension("traceId").and_then(|e| e.as_str()),
                Some("abc"),
                "{spec} {mode}"
            );
        }
    }
}

#[test]
fn structured_binding_rejects_binary_requests() {
    let ev = sample(SpecVersion::V10);
    let msg = BinaryBinding::new(SpecVersion::V10).serialize(&ev).unwrap();
    let err = StructuredBinding::new(SpecVersion::V10)
        .parse(&Payload::from_bytes(msg.body), &msg.headers)
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid content type");
}
