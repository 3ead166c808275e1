//! ceprism gateway: CloudEvents over HTTP.
//!
//! - POST `gateway.path` (default `/events`): binary or structured mode, any
//!   supported spec version
//! - `/healthz`, `/readyz`, `/metrics`
//! - Config from `CEPRISM_CONFIG` (default `ceprism.yaml`)

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use ceprism_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "ceprism-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var("CEPRISM_CONFIG").unwrap_or_else(|_| "ceprism.yaml".into());
    let cfg = config::load_from_file(&path)?;
    // already checked by validate()
    let listen: SocketAddr = cfg.gateway.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    let drain = state.clone();
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "ceprism-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received, draining");
            drain.set_draining();
        })
        .await?;
    Ok(())
}
