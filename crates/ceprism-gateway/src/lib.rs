//! ceprism gateway library entry.
//!
//! Wires the HTTP receiver, receive policy, handler registry, metrics, and
//! the emitter around the `ceprism-core` bindings. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod services;
pub mod transport;
