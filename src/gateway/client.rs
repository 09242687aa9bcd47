//! HTTP client for the external music service: OAuth lifecycle, playlist
//! metadata, and the random-track-fetch-with-dedup algorithm (spec §4.2).
//!
//! Mirrors the teacher's `TgbClient`: one `reqwest::Client` held for
//! connection reuse, bearer auth headers, `tracing` at each call boundary.
//! Unlike `TgbClient` this returns a typed `GatewayError` instead of
//! collapsing every failure into a `String`, since the error taxonomy
//! needs to distinguish rate limits from generic failures end to end.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{Artist, MusicAuth, PlaylistInfo, Track, TrackId};

use super::error::{snippet, GatewayError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RANDOM_TRACK_ATTEMPTS: u32 = 10;

const SCOPES: &[&str] = &[
    "streaming",
    "user-read-email",
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
    "playlist-read-private",
    "playlist-read-collaborative",
];

pub struct MusicGateway {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base_url: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksField {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    id: String,
    name: String,
    images: Vec<PlaylistImage>,
    tracks: PlaylistTracksField,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AlbumResponse {
    name: String,
    images: Vec<AlbumImage>,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    id: Option<String>,
    uri: String,
    name: String,
    artists: Vec<ArtistResponse>,
    album: AlbumResponse,
    duration_ms: u32,
    preview_url: Option<String>,
    is_local: bool,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackResponse>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsWindow {
    items: Vec<PlaylistItem>,
}

impl MusicGateway {
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builds with static config");

        Self {
            http,
            client_id: config.music_client_id.clone(),
            client_secret: config.music_client_secret.clone(),
            redirect_uri: config.music_redirect_uri.clone(),
            auth_base_url: config.music_auth_base_url.clone(),
            api_base_url: config.music_api_base_url.clone(),
        }
    }

    pub fn authorize_url(&self, state: &str) -> String {
        let scope = SCOPES.join(" ");
        format!(
            "{}/authorize?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.auth_base_url,
            urlencoding(&self.client_id),
            urlencoding(&scope),
            urlencoding(&self.redirect_uri),
            urlencoding(state),
        )
    }

    pub async fn exchange_code(&self, code: &str, now_ms: i64) -> Result<MusicAuth, GatewayError> {
        info!("music gateway: exchanging authorization code");
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ];
        let token = self.request_token(&params).await?;
        let user_id = self.fetch_current_user(&token.access_token).await?;

        Ok(MusicAuth {
            access_token: token.access_token,
            refresh_token: token.refresh_token.unwrap_or_default(),
            expires_at_ms: now_ms + token.expires_in * 1000,
            user_id,
        })
    }

    async fn refresh(&self, auth: &MusicAuth, now_ms: i64) -> Result<MusicAuth, GatewayError> {
        info!("music gateway: refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", &auth.refresh_token),
        ];
        let token = self.request_token(&params).await?;

        // The refresh response may omit a new refresh token; retain the prior one.
        let refresh_token = token.refresh_token.unwrap_or_else(|| auth.refresh_token.clone());

        Ok(MusicAuth {
            access_token: token.access_token,
            refresh_token,
            expires_at_ms: now_ms + token.expires_in * 1000,
            user_id: auth.user_id.clone(),
        })
    }

    /// Refreshes a bare refresh token, for the standalone `/api/music/refresh`
    /// HTTP endpoint (no room context, no prior `MusicAuth`).
    pub async fn refresh_from_token(
        &self,
        refresh_token: &str,
        now_ms: i64,
    ) -> Result<(String, String, i64), GatewayError> {
        let params = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];
        let token = self.request_token(&params).await?;
        let next_refresh_token = token.refresh_token.unwrap_or_else(|| refresh_token.to_string());
        Ok((token.access_token, next_refresh_token, now_ms + token.expires_in * 1000))
    }

    /// Returns `auth` unchanged if its expiry is more than 5 minutes away,
    /// otherwise refreshes it.
    pub async fn ensure_valid_token(
        &self,
        auth: &MusicAuth,
        now_ms: i64,
    ) -> Result<MusicAuth, GatewayError> {
        if auth.needs_refresh(now_ms) {
            self.refresh(auth, now_ms).await
        } else {
            Ok(auth.clone())
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, GatewayError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.auth_base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        handle_response(response).await
    }

    pub async fn fetch_current_user(&self, access_token: &str) -> Result<String, GatewayError> {
        let response = self
            .http
            .get(format!("{}/me", self.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let user: CurrentUserResponse = handle_response(response).await?;
        Ok(user.id)
    }

    pub async fn fetch_playlist_info(
        &self,
        playlist_id: &str,
        access_token: &str,
    ) -> Result<PlaylistInfo, GatewayError> {
        let response = self
            .http
            .get(format!("{}/playlists/{}", self.api_base_url, playlist_id))
            .bearer_auth(access_token)
            .query(&[("fields", "id,name,images,tracks.total")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let playlist: PlaylistResponse = handle_response(response).await?;
        Ok(PlaylistInfo {
            id: playlist.id,
            name: playlist.name,
            cover_url: playlist.images.into_iter().next().map(|i| i.url),
            total_tracks: playlist.tracks.total,
        })
    }

    /// Attempts at most 10 random-offset fetches, skipping local files,
    /// missing tracks, and already-used ids. Returns `None` if every
    /// attempt is exhausted or `used_track_ids.len() == total_tracks`.
    pub async fn fetch_random_track(
        &self,
        playlist_id: &str,
        total_tracks: u32,
        used_track_ids: &std::collections::HashSet<TrackId>,
        access_token: &str,
    ) -> Result<Option<Track>, GatewayError> {
        if total_tracks == 0 || used_track_ids.len() as u32 >= total_tracks {
            return Ok(None);
        }

        for attempt in 1..=MAX_RANDOM_TRACK_ATTEMPTS {
            let offset = rand::thread_rng().gen_range(0..total_tracks);
            let response = self
                .http
                .get(format!(
                    "{}/playlists/{}/tracks",
                    self.api_base_url, playlist_id
                ))
                .bearer_auth(access_token)
                .query(&[("limit", "1"), ("offset", &offset.to_string())])
                .send()
                .await
                .map_err(map_transport_error)?;

            let window: PlaylistItemsWindow = handle_response(response).await?;

            let Some(track) = window.items.into_iter().next().and_then(|item| item.track) else {
                warn!(attempt, "music gateway: empty track window at offset {offset}");
                continue;
            };
            if track.is_local {
                continue;
            }
            let Some(track_id) = track.id else {
                continue;
            };
            let track_id = TrackId(track_id);
            if used_track_ids.contains(&track_id) {
                continue;
            }

            return Ok(Some(Track {
                id: track_id,
                uri: track.uri,
                name: track.name,
                artists: track
                    .artists
                    .into_iter()
                    .map(|a| Artist { id: a.id, name: a.name })
                    .collect(),
                album_name: track.album.name,
                album_cover_url: track.album.images.into_iter().next().map(|i| i.url),
                duration_ms: track.duration_ms,
                preview_url: track.preview_url,
                is_local: false,
            }));
        }

        Ok(None)
    }
}

async fn handle_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        return Err(GatewayError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(%status, "music gateway: non-2xx response");
        return Err(GatewayError::Http {
            status: status.as_u16(),
            body_snippet: snippet(&body),
        });
    }

    response.json::<T>().await.map_err(GatewayError::Request)
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Request(err)
    }
}

fn urlencoding(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
