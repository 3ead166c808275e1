//! Transport layer (HTTP).
//!
//! Exposes the POST receive handler and the codec between axum's types and
//! the core binding types.

pub mod codec;
pub mod http;
