//! Shared application state for the gateway.

use std::sync::Arc;

use ceprism_core::error::{CeError, Result};
use ceprism_core::Dispatcher;

use crate::config::GatewayConfig;
use crate::dispatch::HandlerRegistry;
use crate::obs::metrics::GatewayMetrics;
use crate::policy::EventPolicy;
use crate::services::{EchoHandler, LogHandler};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    dispatcher: Dispatcher,
    policy: EventPolicy,
    handlers: HandlerRegistry,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report a bad config instead of panicking.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let policy = EventPolicy::new(&cfg.policy)
            .map_err(|e| CeError::Argument(format!("policy compile failed: {e}")))?;

        let handlers = HandlerRegistry::new(&cfg.routes, cfg.default_handler)?;
        handlers.register(Arc::new(LogHandler::new()));
        handlers.register(Arc::new(EchoHandler::new(cfg.gateway.source.clone())));

        // routes <-> registry sanity check
        let registered = handlers.registered_kinds();
        for kind in handlers.routed_kinds() {
            if !registered.contains(&kind) {
                return Err(CeError::Argument(format!(
                    "routes reference unregistered handler: {}",
                    kind.as_str()
                )));
            }
        }

        let dispatcher = Dispatcher::new();
        tracing::debug!(bindings = ?dispatcher.registered(), "cloudevent bindings registered");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                dispatcher,
                policy,
                handlers,
                metrics: GatewayMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn policy(&self) -> &EventPolicy {
        &self.inner.policy
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Static series appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            (
                "ceprism_bindings_registered",
                self.inner.dispatcher.registered().len() as u64,
            ),
            (
                "ceprism_max_body_bytes",
                self.inner.cfg.gateway.max_body_bytes as u64,
            ),
        ]
    }
}
