//! Top-level facade crate for ceprism.
//!
//! Re-exports the CloudEvents core and the gateway library so users can
//! depend on a single crate.

pub mod core {
    pub use ceprism_core::*;
}

pub mod gateway {
    pub use ceprism_gateway::*;
}

pub use ceprism_core::{CeError, Dispatcher, Event, Mode, Payload, Result, SpecVersion};
