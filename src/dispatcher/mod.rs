//! Transport layer: shared application state and the axum route table.
//!
//! Grounded on the teacher's `handlers/mod.rs` (state struct + route
//! re-exports assembled in `main.rs`), generalized from a single Solana
//! RPC client in shared state to the five services a room's lifecycle
//! touches.

mod http;
mod hub;
mod ws;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::Config;
use crate::engine::GameEngine;
use crate::gateway::MusicGateway;
use crate::registry::Registry;

pub use hub::ConnectionHub;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub engine: Arc<GameEngine>,
    pub gateway: Arc<MusicGateway>,
    pub hub: Arc<ConnectionHub>,
    pub config: Arc<Config>,
    pub started_at_ms: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/music/auth", get(http::begin_auth))
        .route("/api/music/callback", get(http::callback))
        .route("/api/music/refresh", post(http::refresh))
        .route("/health", get(http::health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            music_client_id: "id".into(),
            music_client_secret: "secret".into(),
            music_redirect_uri: "https://example.com/callback".into(),
            music_auth_base_url: "https://accounts.music-service.example".into(),
            music_api_base_url: "https://api.music-service.example/v1".into(),
            server_base_url: "http://localhost:8080".into(),
            port: 8080,
            environment: crate::config::Environment::Development,
        }
    }

    fn test_state() -> AppState {
        let config = Arc::new(test_config());
        let registry = Arc::new(Registry::new());
        let gateway = Arc::new(MusicGateway::new(&config));
        let hub = Arc::new(ConnectionHub::new());
        let sink: Arc<dyn crate::engine::EventSink> = hub.clone();
        let engine = Arc::new(GameEngine::new(registry.clone(), gateway.clone(), sink));
        AppState { registry, engine, gateway, hub, config, started_at_ms: crate::registry::now_ms() }
    }

    #[tokio::test]
    async fn health_endpoint_reports_room_count() {
        let app = router(test_state());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["rooms"], 0);
    }
}
