//! Built-in event handlers.

pub mod echo;
pub mod log;

pub use echo::EchoHandler;
pub use log::LogHandler;
