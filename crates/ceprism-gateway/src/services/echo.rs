use async_trait::async_trait;

use ceprism_core::error::Result;
use ceprism_core::Event;

use crate::config::HandlerKind;
use crate::dispatch::{EventHandler, Reply};

/// Answers each event with a fresh event carrying the same type and data.
/// Useful to prove the receive/emit path end to end.
pub struct EchoHandler {
    source: String,
}

impl EchoHandler {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[async_trait]
impl EventHandler for EchoHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Echo
    }

    async fn handle(&self, event: Event) -> Result<Reply> {
        let mut reply = Event::new(event.spec_version());
        reply.set_type(event.ty()).set_source(self.source.as_str());
        if let Some(ct) = event.data_content_type() {
            reply.set_data_content_type(ct);
        }
        if let Some(data) = event.raw_data() {
            reply.set_data(data.clone());
        }
        tracing::debug!(request_id = %event.id(), reply_id = %reply.id(), "echo reply");
        Ok(Reply::Event(reply))
    }
}
