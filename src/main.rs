//! Entry point: loads configuration, wires the registry/gateway/engine/hub
//! stack, and serves the HTTP + WebSocket surface on one axum router.

mod config;
mod dispatcher;
mod engine;
mod error;
mod gateway;
mod matcher;
mod models;
mod registry;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use dispatcher::{AppState, ConnectionHub};
use engine::{EventSink, GameEngine};
use gateway::MusicGateway;
use registry::Registry;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noteguess_server=debug,tower_http=debug,axum=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config::load_env();
    let config = Arc::new(Config::from_env().context("invalid configuration")?);

    let registry = Arc::new(Registry::new());
    let gateway = Arc::new(MusicGateway::new(&config));
    let hub = Arc::new(ConnectionHub::new());
    let sink: Arc<dyn EventSink> = hub.clone();
    let engine = Arc::new(GameEngine::new(registry.clone(), gateway.clone(), sink));

    let state = AppState {
        registry: registry.clone(),
        engine,
        gateway,
        hub,
        config: config.clone(),
        started_at_ms: registry::now_ms(),
    };

    let sweep_hub = state.hub.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            for room_code in registry.sweep().await {
                sweep_hub.remove_room(&room_code);
            }
        }
    });

    let app = dispatcher::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "noteguess-server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
