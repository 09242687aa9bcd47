//! The non-realtime HTTP surface (spec §4.5): the OAuth callback
//! handshake, the refresh endpoint, and health.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Redirect};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::AppError;
use crate::registry::now_ms;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    room: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OAuthState {
    room_code: String,
    issued_at_ms: i64,
}

fn encode_state(room_code: &str) -> String {
    let payload = OAuthState { room_code: room_code.to_string(), issued_at_ms: now_ms() };
    let json = serde_json::to_vec(&payload).expect("OAuthState always serializes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
}

fn decode_state(state: &str) -> Result<OAuthState, AppError> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(state)
        .map_err(|_| AppError::Validation("invalid OAuth state parameter".into()))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::Validation("invalid OAuth state parameter".into()))
}

/// `GET /api/music/auth?room=<code>` — begins the OAuth handshake, carrying
/// the room code through the opaque `state` parameter.
pub async fn begin_auth(State(state): State<AppState>, Query(query): Query<AuthQuery>) -> impl IntoResponse {
    let oauth_state = encode_state(&query.room);
    Redirect::to(&state.gateway.authorize_url(&oauth_state))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// `GET /api/music/callback` — completes the code exchange and redirects
/// back to the room URL with tokens in the URL fragment, so the server
/// never logs them and they never reach a request log or a Referer header.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    let oauth_state = decode_state(&query.state)?;
    let auth = state
        .gateway
        .exchange_code(&query.code, now_ms())
        .await
        .map_err(|e| {
            error!(error = %e, "OAuth code exchange failed");
            AppError::from(e)
        })?;

    let fragment = format!(
        "access_token={}&refresh_token={}&expires_in={}&user_id={}",
        auth.access_token,
        auth.refresh_token,
        (auth.expires_at_ms - now_ms()) / 1000,
        auth.user_id,
    );
    let redirect_url = format!(
        "{}/room/{}#{}",
        state.config.server_base_url, oauth_state.room_code, fragment
    );

    info!(room_code = %oauth_state.room_code, "music account connected via OAuth callback");
    Ok(Redirect::to(&redirect_url))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

/// `POST /api/music/refresh` — exchanges a refresh token for a fresh
/// access/refresh pair, independent of any room.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let (access_token, refresh_token, expires_at_ms) = state
        .gateway
        .refresh_from_token(&body.refresh_token, now_ms())
        .await?;

    Ok(Json(RefreshResponse {
        access_token,
        refresh_token,
        expires_in: (expires_at_ms - now_ms()) / 1000,
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_secs = ((now_ms() - state.started_at_ms) / 1000).max(0) as u64;
    Json(serde_json::json!({
        "status": "ok",
        "rooms": state.registry.room_count(),
        "uptime_secs": uptime_secs,
    }))
}
