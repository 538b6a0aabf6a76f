use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::Config;
use feeds::{build_http_client, SourceResolver};
use strategy::SignalConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let signal_config = match cfg.signal_config_path.as_deref() {
        Some(path) => {
            info!(path, "Loading signal config");
            SignalConfig::load(path)
        }
        None => SignalConfig::default(),
    };
    info!(
        port = cfg.port,
        providers = ?cfg.provider_order,
        "Tapewatch starting"
    );

    // ── Data sources ──────────────────────────────────────────────────────────
    let http = build_http_client().context("failed to build HTTP client")?;
    let resolver = SourceResolver::from_config(&cfg, http);

    // ── API ───────────────────────────────────────────────────────────────────
    let state = api::AppState::new(resolver, signal_config);
    let port = cfg.port;
    let server = tokio::spawn(async move {
        if let Err(e) = api::serve(state, port).await {
            error!(error = %e, "API server stopped");
        }
    });

    info!("Waiting for shutdown signal.");
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            info!("Shutdown signal received. Exiting.");
        }
        _ = server => {
            anyhow::bail!("API server exited unexpectedly");
        }
    }
    Ok(())
}
