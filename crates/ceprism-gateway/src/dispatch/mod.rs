//! Event handler registry.
//!
//! Re-exports the registry and handler trait so downstream consumers can
//! depend on this module directly.

pub mod registry;

pub use registry::{EventHandler, HandlerRegistry, Reply};
