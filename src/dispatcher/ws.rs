//! WebSocket upgrade and per-connection dispatch loop (spec §4.5).
//!
//! Generalizes the teacher's echo-mode socket handler (split sender/
//! receiver, forward frames) into the full event dispatch the spec
//! requires: inbound `ClientEvent`s are routed to the Registry or Engine;
//! outbound frames arrive over two channels selected concurrently — a
//! per-connection unicast `mpsc` and, once the connection has joined a
//! room, that room's broadcast group.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{ClientEvent, ConnectionId, GameStatus, PlayerId, ServerEvent};
use crate::registry::RegistryError;

use super::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = ConnectionId::new();
    let mut unicast_rx = state.hub.register_connection(connection_id.clone());
    let mut room_rx: Option<broadcast::Receiver<ServerEvent>> = None;

    info!(%connection_id, "websocket connection established");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        dispatch(&state, &connection_id, &text, &mut room_rx).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        warn!(%connection_id, error = %err, "websocket read error");
                        break;
                    }
                    _ => {}
                }
            }
            Some(event) = unicast_rx.recv() => {
                if send_event(&mut sender, &event).await.is_err() {
                    break;
                }
            }
            event = recv_room(&mut room_rx) => {
                if let Some(event) = event {
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    on_disconnect(&state, &connection_id).await;
    info!(%connection_id, "websocket connection closed");
}

async fn recv_room(rx: &mut Option<broadcast::Receiver<ServerEvent>>) -> Option<ServerEvent> {
    match rx {
        Some(receiver) => match receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "room broadcast receiver lagged, dropping skipped frames");
                None
            }
        },
        None => std::future::pending().await,
    }
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).expect("ServerEvent always serializes");
    sender.send(Message::Text(text.into())).await
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    text: &str,
    room_rx: &mut Option<broadcast::Receiver<ServerEvent>>,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(err) => {
            debug!(%connection_id, error = %err, "could not parse client event");
            let app_err = AppError::Validation("malformed message".to_string());
            state.hub.send_to_connection(connection_id, app_err.to_ws_event());
            return;
        }
    };

    if let Err(err) = handle_event(state, connection_id, event, room_rx).await {
        state.hub.send_to_connection(connection_id, err.to_ws_event());
    }
}

async fn handle_event(
    state: &AppState,
    connection_id: &ConnectionId,
    event: ClientEvent,
    room_rx: &mut Option<broadcast::Receiver<ServerEvent>>,
) -> Result<(), AppError> {
    match event {
        ClientEvent::CreateRoom { nickname } => {
            let nickname = validate_nickname(nickname)?;
            let (shared, player_id) = state
                .registry
                .create_room(nickname, connection_id.clone())
                .map_err(|e| AppError::Validation(e.to_string()))?;

            let room_code = shared.lock().await.code.0.clone();
            *room_rx = Some(state.hub.subscribe_room(&room_code));

            let view = state.registry.serialize_room(&shared).await;
            state
                .hub
                .send_to_connection(connection_id, ServerEvent::RoomJoined { room: view, player_id });
        }

        ClientEvent::JoinRoom { room_code, nickname } => {
            let nickname = validate_nickname(nickname)?;
            let outcome = state
                .registry
                .join_room(&room_code, nickname, connection_id.clone())
                .await
                .map_err(map_registry_error)?;

            *room_rx = Some(state.hub.subscribe_room(&room_code));

            let view = state.registry.serialize_room(&outcome.room).await;
            state.hub.send_to_connection(
                connection_id,
                ServerEvent::RoomJoined { room: view, player_id: outcome.player_id.clone() },
            );

            let (player, is_host_resuming) = {
                let room = outcome.room.lock().await;
                let player = room.players.get(&outcome.player_id).cloned();
                let is_host_resuming = outcome.is_rejoin
                    && room.host_id == outcome.player_id
                    && room.game_state.is_paused;
                (player, is_host_resuming)
            };

            if let Some(player) = player {
                if outcome.is_rejoin {
                    state.hub.broadcast_room(
                        &room_code,
                        ServerEvent::PlayerReconnected {
                            player_id: outcome.player_id.clone(),
                            nickname: player.nickname.clone(),
                        },
                    );
                } else {
                    state.hub.broadcast_room(&room_code, ServerEvent::PlayerJoined { player });
                }
            }

            if is_host_resuming {
                state.engine.resume_game(&room_code).await;
            }
        }

        ClientEvent::LeaveRoom {} => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            let nickname = {
                let shared = state.registry.get_room(&room_code);
                match shared {
                    Some(shared) => shared.lock().await.players.get(&player_id).map(|p| p.nickname.clone()),
                    None => None,
                }
            };

            if let Some((removed_code, _player_id, deleted)) =
                state.registry.remove_player(connection_id).await
            {
                if !deleted {
                    if let Some(shared) = state.registry.get_room(&removed_code) {
                        state.hub.broadcast_room(
                            &removed_code,
                            ServerEvent::PlayerLeft { player_id, nickname: nickname.unwrap_or_default() },
                        );
                        let view = state.registry.serialize_room(&shared).await;
                        state.hub.broadcast_room(&removed_code, ServerEvent::RoomUpdated { room: view });
                    }
                } else {
                    state.hub.remove_room(&removed_code);
                }
            }
            *room_rx = None;
        }

        ClientEvent::StartGame {} => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            state.engine.start_game(&room_code, &player_id).await?;
        }

        ClientEvent::SubmitAnswer { song_title, artist } => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            state.engine.submit_answer(&room_code, &player_id, song_title, artist).await?;
        }

        ClientEvent::RestartGame {} => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            state.engine.restart_game(&room_code, &player_id).await?;
        }

        ClientEvent::SetMusicAuth { access_token, refresh_token, expires_in } => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            let user_id = state
                .engine
                .set_music_auth(&room_code, &player_id, access_token, refresh_token, expires_in)
                .await?;
            state.hub.send_to_connection(connection_id, ServerEvent::MusicConnected { user_id });
        }

        ClientEvent::LoadPlaylist { playlist_id } => {
            let (room_code, player_id) = caller_location(state, connection_id).await?;
            let playlist = state.engine.load_playlist(&room_code, &player_id, &playlist_id).await?;
            let track_count = playlist.total_tracks;
            state
                .hub
                .send_to_connection(connection_id, ServerEvent::PlaylistLoaded { playlist, track_count });
        }

        ClientEvent::PlaybackReady {} | ClientEvent::PlaybackEnded {} => {
            debug!(%connection_id, "playback status notification received");
        }
    }

    Ok(())
}

fn validate_nickname(nickname: String) -> Result<String, AppError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("nickname must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

async fn caller_location(
    state: &AppState,
    connection_id: &ConnectionId,
) -> Result<(String, PlayerId), AppError> {
    let player_id = state
        .registry
        .get_player_by_connection(connection_id)
        .ok_or_else(|| AppError::Validation("not currently in a room".to_string()))?;
    let shared = state
        .registry
        .get_room_by_connection(connection_id)
        .ok_or_else(|| AppError::Validation("not currently in a room".to_string()))?;
    let room_code = shared.lock().await.code.0.clone();
    Ok((room_code, player_id))
}

fn map_registry_error(err: RegistryError) -> AppError {
    match err {
        RegistryError::RoomNotFound(_) => AppError::Validation(err.to_string()),
        RegistryError::RoomFull | RegistryError::RoomNotJoinable => AppError::InvalidState(err.to_string()),
        RegistryError::UnboundConnection | RegistryError::CodeExhausted => {
            AppError::Validation(err.to_string())
        }
    }
}

async fn on_disconnect(state: &AppState, connection_id: &ConnectionId) {
    state.hub.remove_connection(connection_id);

    let Some((shared, _player_id)) = state.registry.handle_disconnect(connection_id).await else {
        return;
    };

    let (room_code, is_paused) = {
        let room = shared.lock().await;
        (room.code.0.clone(), room.game_state.is_paused && room.game_state.status == GameStatus::Playing)
    };

    let view = state.registry.serialize_room(&shared).await;
    state.hub.broadcast_room(&room_code, ServerEvent::RoomUpdated { room: view });

    if is_paused {
        state.engine.pause_round_timer(&room_code);
        state.hub.broadcast_room(
            &room_code,
            ServerEvent::GamePaused { reason: "host disconnected".to_string() },
        );
    }
}
