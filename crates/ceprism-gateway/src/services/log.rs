use async_trait::async_trait;

use ceprism_core::error::Result;
use ceprism_core::Event;

use crate::config::HandlerKind;
use crate::dispatch::{EventHandler, Reply};

/// Logs accepted events and acknowledges them.
#[derive(Debug, Default)]
pub struct LogHandler;

impl LogHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHandler for LogHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Log
    }

    async fn handle(&self, event: Event) -> Result<Reply> {
        tracing::info!(
            id = %event.id(),
            ty = %event.ty(),
            source = %event.source(),
            version = %event.spec_version(),
            extensions = event.extensions().len(),
            has_data = event.raw_data().is_some(),
            "event received"
        );
        Ok(Reply::Ack)
    }
}
