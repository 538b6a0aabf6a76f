pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use feeds::SourceResolver;
use strategy::SignalConfig;

pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SourceResolver>,
    pub signal_config: Arc<SignalConfig>,
}

impl AppState {
    pub fn new(resolver: SourceResolver, signal_config: SignalConfig) -> Self {
        Self {
            resolver: Arc::new(resolver),
            signal_config: Arc::new(signal_config),
        }
    }
}

/// All routes with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::market_router())
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
}

/// Build and run the Axum API server.
pub async fn serve(state: AppState, port: u16) -> common::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Market data API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
