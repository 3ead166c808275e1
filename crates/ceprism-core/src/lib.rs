//! ceprism core: CloudEvents envelope, per-version binding tables, JSON
//! Schema validation, and the HTTP binary/structured bindings.
//!
//! Everything here is synchronous and transport-agnostic. The HTTP server,
//! policy, and emitter live in `ceprism-gateway`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `CeError`/`Result` so a receiver never
//! crashes on a malformed request.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod binding;
pub mod error;
pub mod event;
pub mod spec;
pub mod validation;

/// Shared result type.
pub use error::{CeError, ClientCode, Result};

pub use binding::{Dispatcher, Headers, Message, Mode, Payload};
pub use event::{Data, Event, EventBuilder, ExtensionValue};
pub use spec::{Attribute, ContentEncoding, SpecVersion};
