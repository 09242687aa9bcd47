//! Per-room round state machine (spec §4.4): countdown, track fetch,
//! submissions with early termination, scoring, reveal, elimination every
//! sixth round, termination on a single survivor.
//!
//! Every suspension point (a Music Gateway call) follows the discipline
//! spec.md §5 requires: gather inputs under the room lock, drop the lock,
//! await the network call, then re-acquire and re-validate status before
//! applying the result. This generalizes the way the teacher's
//! `SolanaService`/`TgbClient` separate "gather inputs" from "await
//! network" from "apply result" into an explicit lock-drop-reacquire.

mod sink;
mod timers;

pub use sink::EventSink;

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::gateway::MusicGateway;
use crate::matcher;
use crate::models::{
    CurrentAnswer, FinalStanding, GameState, GameStatus, MusicAuth, PlaybackCommandKind,
    PlayerId, PlaylistInfo, RoundResult, ScoringClass, ServerEvent,
};
use crate::registry::{now_ms, Registry};

use crate::error::AppError;

use timers::RoomTimers;

const GAME_START_DELAY_MS: u64 = 5_000;
const ELIMINATION_NEXT_DELAY_MS: u64 = 3_000;
const PLAYLIST_LOAD_COOLDOWN_MS: i64 = 5_000;

pub struct GameEngine {
    registry: Arc<Registry>,
    gateway: Arc<MusicGateway>,
    sink: Arc<dyn EventSink>,
    timers: RoomTimers,
}

impl GameEngine {
    pub fn new(registry: Arc<Registry>, gateway: Arc<MusicGateway>, sink: Arc<dyn EventSink>) -> Self {
        Self { registry, gateway, sink, timers: RoomTimers::new() }
    }

    pub async fn start_game(self: &Arc<Self>, room_code: &str, caller: &PlayerId) -> Result<(), AppError> {
        let shared = self
            .registry
            .get_room(room_code)
            .ok_or_else(|| AppError::Validation("room not found".into()))?;

        {
            let mut room = shared.lock().await;
            if &room.host_id != caller {
                return Err(AppError::Unauthorized("only the host can start the game".into()));
            }
            if room.game_state.status != GameStatus::Lobby {
                return Err(AppError::InvalidState("game already started".into()));
            }
            if room.connected_player_count() < 2 {
                return Err(AppError::InvalidState("need at least 2 connected players".into()));
            }
            if room.music_auth.is_none() {
                return Err(AppError::InvalidState("host has not connected a music account".into()));
            }
            if room.playlist.is_none() {
                return Err(AppError::InvalidState("no playlist loaded".into()));
            }

            for player in room.players.values_mut() {
                player.reset_for_new_game();
            }
            room.used_track_ids.clear();
            room.game_state.status = GameStatus::Starting;
            room.game_state.winner_id = None;
        }

        self.sink.broadcast_room(
            room_code,
            ServerEvent::GameStarting { starts_in: GAME_START_DELAY_MS },
        );

        let engine = Arc::clone(self);
        let code = room_code.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(GAME_START_DELAY_MS)).await;
            engine.start_next_round(&code).await;
        });

        Ok(())
    }

    pub async fn start_next_round(self: &Arc<Self>, room_code: &str) {
        let Some(shared) = self.registry.get_room(room_code) else { return };

        let (auth, playlist, used_ids) = {
            let room = shared.lock().await;
            if room.game_state.is_paused {
                return;
            }
            let active_count = room.active_players().len();
            if active_count <= 1 {
                let winner = room.active_players().first().map(|p| p.id.clone());
                drop(room);
                self.end_game(room_code, winner).await;
                return;
            }
            let Some(auth) = room.music_auth.clone() else {
                drop(room);
                self.end_game(room_code, None).await;
                return;
            };
            let Some(playlist) = room.playlist.clone() else {
                drop(room);
                self.end_game(room_code, None).await;
                return;
            };
            (auth, playlist, room.used_track_ids.clone())
        };

        let auth = match self.gateway.ensure_valid_token(&auth, now_ms()).await {
            Ok(auth) => auth,
            Err(err) => {
                warn!(%room_code, error = %err, "token refresh failed, ending game with no winner");
                self.end_game(room_code, None).await;
                return;
            }
        };

        // Apply a refreshed token only if the room hasn't moved on while we awaited.
        {
            let mut room = shared.lock().await;
            if matches!(room.game_state.status, GameStatus::Lobby | GameStatus::GameOver) {
                return;
            }
            room.music_auth = Some(auth.clone());
        }

        let mut track = self
            .gateway
            .fetch_random_track(&playlist.id, playlist.total_tracks, &used_ids, &auth.access_token)
            .await
            .unwrap_or(None);

        if track.is_none() {
            let mut room = shared.lock().await;
            room.used_track_ids.clear();
            drop(room);
            track = self
                .gateway
                .fetch_random_track(
                    &playlist.id,
                    playlist.total_tracks,
                    &std::collections::HashSet::new(),
                    &auth.access_token,
                )
                .await
                .unwrap_or(None);
        }

        let Some(track) = track else {
            self.end_game(room_code, None).await;
            return;
        };

        let (host_connection, round_number, duration_ms) = {
            let mut room = shared.lock().await;
            if matches!(room.game_state.status, GameStatus::Lobby | GameStatus::GameOver) {
                return;
            }

            room.used_track_ids.insert(track.id.clone());
            for player in room.players.values_mut() {
                player.reset_for_new_round();
            }

            room.game_state.current_round += 1;
            room.game_state.status = GameStatus::Playing;
            let now = now_ms();
            room.game_state.round_start_time_ms = now;
            room.game_state.round_end_time_ms = now + room.settings.round_duration_ms as i64;
            room.game_state.current_track = Some(track.clone());

            let host_connection = room.players.get(&room.host_id).and_then(|p| p.connection_id.clone());
            (host_connection, room.game_state.current_round, room.settings.round_duration_ms)
        };

        self.sink.broadcast_room(
            room_code,
            ServerEvent::RoundStarted { round_number, duration_ms, track_uri: track.uri.clone() },
        );

        if let Some(conn) = host_connection {
            self.sink.send_to_connection(
                &conn,
                ServerEvent::PlaybackCommand {
                    command: PlaybackCommandKind::Play,
                    track_uri: Some(track.uri.clone()),
                    position_ms: Some(0),
                },
            );
        }

        let engine = Arc::clone(self);
        let code = room_code.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            engine.end_round(&code).await;
        });
        self.timers.arm_round(room_code, handle);
    }

    pub async fn submit_answer(
        self: &Arc<Self>,
        room_code: &str,
        player_id: &PlayerId,
        song_title: String,
        artist: String,
    ) -> Result<(), AppError> {
        let shared = self
            .registry
            .get_room(room_code)
            .ok_or_else(|| AppError::Validation("room not found".into()))?;

        let (nickname, all_submitted) = {
            let mut room = shared.lock().await;
            if room.game_state.status != GameStatus::Playing {
                return Err(AppError::InvalidState("not accepting answers right now".into()));
            }
            let is_eliminated = room
                .players
                .get(player_id)
                .ok_or_else(|| AppError::Validation("unknown player".into()))?
                .is_eliminated;
            if is_eliminated {
                return Err(AppError::InvalidState("eliminated players cannot submit".into()));
            }

            let submitted_at_ms = now_ms();
            let player = room.players.get_mut(player_id).unwrap();
            player.current_answer = Some(CurrentAnswer { song_title, artist, submitted_at_ms });
            player.has_submitted = true;
            let nickname = player.nickname.clone();

            let all_submitted = room.active_players().iter().all(|p| p.has_submitted);
            (nickname, all_submitted)
        };

        self.sink.broadcast_room(
            room_code,
            ServerEvent::PlayerSubmitted { player_id: player_id.clone(), nickname },
        );

        if all_submitted {
            self.timers.cancel_round(room_code);
            self.end_round(room_code).await;
        }

        Ok(())
    }

    pub async fn end_round(self: &Arc<Self>, room_code: &str) {
        let Some(shared) = self.registry.get_room(room_code) else { return };
        self.timers.cancel_round(room_code);

        let (host_connection, results, track, next_in_ms, is_elim_round) = {
            let mut room = shared.lock().await;
            if room.game_state.status != GameStatus::Playing || room.game_state.is_paused {
                return;
            }
            room.game_state.status = GameStatus::RoundReveal;

            let track = room
                .game_state
                .current_track
                .clone()
                .expect("round active implies a current track");

            let active_ids: Vec<PlayerId> = room
                .player_order
                .iter()
                .filter(|id| room.players.get(*id).map(|p| !p.is_eliminated).unwrap_or(false))
                .cloned()
                .collect();

            let mut results = Vec::with_capacity(active_ids.len());
            for id in active_ids {
                let answer = room.players.get(&id).and_then(|p| p.current_answer.clone());
                let (song_correct, artist_correct, class) = match &answer {
                    Some(answer) => {
                        let song_correct = matcher::title_is_correct(&answer.song_title, &track.name);
                        let artist_correct = matcher::artist_is_correct(&answer.artist, &track);
                        (Some(song_correct), Some(artist_correct), matcher::classify(song_correct, artist_correct))
                    }
                    None => (None, None, ScoringClass::None),
                };

                let player = room.players.get_mut(&id).unwrap();
                player.apply_pace_delta(class.pace_delta());
                player.last_round_result = Some(class);

                results.push(RoundResult {
                    player_id: id,
                    nickname: player.nickname.clone(),
                    song_correct,
                    artist_correct,
                    result: class,
                    new_pace: player.pace,
                });
            }

            let host_connection = room.players.get(&room.host_id).and_then(|p| p.connection_id.clone());
            let is_elim_round = matcher::is_elimination_round(room.game_state.current_round);
            let next_in_ms = if is_elim_round {
                ELIMINATION_NEXT_DELAY_MS
            } else {
                room.settings.reveal_duration_ms
            };

            (host_connection, results, track, next_in_ms, is_elim_round)
        };

        if let Some(conn) = host_connection {
            self.sink.send_to_connection(
                &conn,
                ServerEvent::PlaybackCommand { command: PlaybackCommandKind::Stop, track_uri: None, position_ms: None },
            );
        }

        self.sink.broadcast_room(
            room_code,
            ServerEvent::RoundEnded { track, results, next_round_in: next_in_ms },
        );

        let engine = Arc::clone(self);
        let code = room_code.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(next_in_ms)).await;
            if is_elim_round {
                engine.check_eliminations(&code).await;
            } else {
                engine.start_next_round(&code).await;
            }
        });
        self.timers.arm_reveal(room_code, handle);
    }

    pub async fn check_eliminations(self: &Arc<Self>, room_code: &str) {
        let Some(shared) = self.registry.get_room(room_code) else { return };

        let (round, threshold, leader_pace, eliminated, survivors) = {
            let mut room = shared.lock().await;
            if room.game_state.status != GameStatus::RoundReveal {
                return;
            }
            room.game_state.status = GameStatus::EliminationCheck;

            let round = room.game_state.current_round;
            let threshold = matcher::elimination_threshold(round);

            let active_ids: Vec<PlayerId> = room
                .player_order
                .iter()
                .filter(|id| room.players.get(*id).map(|p| !p.is_eliminated).unwrap_or(false))
                .cloned()
                .collect();

            let leader_pace = active_ids
                .iter()
                .filter_map(|id| room.players.get(id).map(|p| p.pace))
                .max()
                .unwrap_or(0);

            let mut eliminated = Vec::new();
            let mut survivors = Vec::new();
            for id in &active_ids {
                let pace = room.players.get(id).unwrap().pace;
                if leader_pace - pace >= threshold {
                    eliminated.push(id.clone());
                    let player = room.players.get_mut(id).unwrap();
                    player.is_eliminated = true;
                    player.eliminated_round = Some(round);
                } else {
                    survivors.push(id.clone());
                }
            }

            (round, threshold, leader_pace, eliminated, survivors)
        };

        info!(%room_code, round, eliminated = eliminated.len(), "elimination check");

        self.sink.broadcast_room(
            room_code,
            ServerEvent::EliminationCheck {
                round,
                threshold,
                leader_pace,
                eliminated,
                survivors: survivors.clone(),
            },
        );

        let will_end = survivors.len() <= 1;
        let winner = if will_end { survivors.into_iter().next() } else { None };

        let engine = Arc::clone(self);
        let code = room_code.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ELIMINATION_NEXT_DELAY_MS)).await;
            if will_end {
                engine.end_game(&code, winner).await;
            } else {
                engine.start_next_round(&code).await;
            }
        });
        self.timers.arm_reveal(room_code, handle);
    }

    pub async fn end_game(self: &Arc<Self>, room_code: &str, winner_id: Option<PlayerId>) {
        let Some(shared) = self.registry.get_room(room_code) else { return };

        let (host_connection, winner_nickname, final_standings) = {
            let mut room = shared.lock().await;
            room.game_state.status = GameStatus::GameOver;
            room.game_state.winner_id = winner_id.clone();

            let host_connection = room.players.get(&room.host_id).and_then(|p| p.connection_id.clone());
            let winner_nickname = winner_id
                .as_ref()
                .and_then(|id| room.players.get(id))
                .map(|p| p.nickname.clone());

            let mut standings: Vec<FinalStanding> = room
                .players_in_order()
                .into_iter()
                .map(|p| FinalStanding {
                    player_id: p.id.clone(),
                    nickname: p.nickname.clone(),
                    pace: p.pace,
                    is_eliminated: p.is_eliminated,
                    eliminated_round: p.eliminated_round,
                })
                .collect();

            standings.sort_by(|a, b| compare_final_standing(a, b, &winner_id));

            (host_connection, winner_nickname, standings)
        };

        self.timers.cancel_all(room_code);

        if let Some(conn) = host_connection {
            self.sink.send_to_connection(
                &conn,
                ServerEvent::PlaybackCommand { command: PlaybackCommandKind::Stop, track_uri: None, position_ms: None },
            );
        }

        self.sink.broadcast_room(
            room_code,
            ServerEvent::GameOver { winner_id, winner_nickname, final_standings },
        );
    }

    pub async fn restart_game(self: &Arc<Self>, room_code: &str, caller: &PlayerId) -> Result<(), AppError> {
        let shared = self
            .registry
            .get_room(room_code)
            .ok_or_else(|| AppError::Validation("room not found".into()))?;

        self.timers.cancel_all(room_code);

        {
            let mut room = shared.lock().await;
            if &room.host_id != caller {
                return Err(AppError::Unauthorized("only the host can restart".into()));
            }
            room.game_state = GameState::default();
            for player in room.players.values_mut() {
                player.reset_for_new_game();
            }
            room.used_track_ids.clear();
        }

        let view = self.registry.serialize_room(&shared).await;
        self.sink.broadcast_room(room_code, ServerEvent::RoomUpdated { room: view });
        Ok(())
    }

    /// Invoked when the Registry has just paused a room because its host
    /// disconnected mid-round (spec §5: "the round timer is cancelled
    /// when...the host disconnects mid-round"). Best-effort like every other
    /// timer cancellation; `end_round` also re-checks `is_paused` under the
    /// lock in case this race loses to an in-flight timer callback.
    pub fn pause_round_timer(&self, room_code: &str) {
        self.timers.cancel_round(room_code);
    }

    /// Invoked when the host reconnects while `isPaused` is true.
    pub async fn resume_game(self: &Arc<Self>, room_code: &str) {
        let Some(shared) = self.registry.get_room(room_code) else { return };

        let was_playing = {
            let mut room = shared.lock().await;
            if !room.game_state.is_paused {
                return;
            }
            room.game_state.is_paused = false;
            room.game_state.pause_reason = None;
            room.game_state.status == GameStatus::Playing
        };

        self.sink.broadcast_room(room_code, ServerEvent::GameResumed {});

        if was_playing {
            self.start_next_round(room_code).await;
        }
    }

    pub async fn set_music_auth(
        self: &Arc<Self>,
        room_code: &str,
        caller: &PlayerId,
        access_token: String,
        refresh_token: String,
        expires_in: i64,
    ) -> Result<String, AppError> {
        let shared = self
            .registry
            .get_room(room_code)
            .ok_or_else(|| AppError::Validation("room not found".into()))?;

        {
            let room = shared.lock().await;
            if &room.host_id != caller {
                return Err(AppError::Unauthorized("only the host can connect a music account".into()));
            }
        }

        let user_id = self.gateway.fetch_current_user(&access_token).await?;

        {
            let mut room = shared.lock().await;
            room.music_auth = Some(MusicAuth {
                access_token,
                refresh_token,
                expires_at_ms: now_ms() + expires_in * 1000,
                user_id: user_id.clone(),
            });
        }

        Ok(user_id)
    }

    pub async fn load_playlist(
        self: &Arc<Self>,
        room_code: &str,
        caller: &PlayerId,
        playlist_ref: &str,
    ) -> Result<PlaylistInfo, AppError> {
        let shared = self
            .registry
            .get_room(room_code)
            .ok_or_else(|| AppError::Validation("room not found".into()))?;

        let access_token = {
            let room = shared.lock().await;
            if &room.host_id != caller {
                return Err(AppError::Unauthorized("only the host can load a playlist".into()));
            }
            if let Some(last) = room.last_playlist_load_ms {
                let elapsed = now_ms() - last;
                if elapsed < PLAYLIST_LOAD_COOLDOWN_MS {
                    let retry_after_secs = ((PLAYLIST_LOAD_COOLDOWN_MS - elapsed) / 1000).max(1) as u64;
                    return Err(AppError::RateLimited { retry_after_secs });
                }
            }
            let auth = room
                .music_auth
                .clone()
                .ok_or_else(|| AppError::InvalidState("connect a music account first".into()))?;
            auth.access_token
        };

        let playlist_id = crate::gateway::parse_playlist_id(playlist_ref)
            .ok_or_else(|| AppError::Validation("could not parse playlist reference".into()))?;

        let playlist = self.gateway.fetch_playlist_info(&playlist_id, &access_token).await?;

        {
            let mut room = shared.lock().await;
            room.playlist = Some(playlist.clone());
            room.last_playlist_load_ms = Some(now_ms());
        }

        Ok(playlist)
    }
}

fn compare_final_standing(
    a: &FinalStanding,
    b: &FinalStanding,
    winner_id: &Option<PlayerId>,
) -> Ordering {
    let a_is_winner = winner_id.as_ref() == Some(&a.player_id);
    let b_is_winner = winner_id.as_ref() == Some(&b.player_id);
    if a_is_winner != b_is_winner {
        return if a_is_winner { Ordering::Less } else { Ordering::Greater };
    }
    if a.is_eliminated != b.is_eliminated {
        return if a.is_eliminated { Ordering::Greater } else { Ordering::Less };
    }
    if a.is_eliminated {
        let a_round = a.eliminated_round.unwrap_or(0);
        let b_round = b.eliminated_round.unwrap_or(0);
        if a_round != b_round {
            return b_round.cmp(&a_round);
        }
    }
    b.pace.cmp(&a.pace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ConnectionId, MusicAuth};
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        events: StdMutex<Vec<ServerEvent>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self { events: StdMutex::new(Vec::new()) })
        }
    }

    impl EventSink for RecordingSink {
        fn broadcast_room(&self, _room_code: &str, event: ServerEvent) {
            self.events.lock().unwrap().push(event);
        }
        fn send_to_connection(&self, _connection_id: &crate::models::ConnectionId, event: ServerEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

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

    fn test_engine() -> (Arc<GameEngine>, Arc<Registry>, Arc<RecordingSink>) {
        let registry = Arc::new(Registry::new());
        let gateway = Arc::new(MusicGateway::new(&test_config()));
        let sink = RecordingSink::new();
        let engine = Arc::new(GameEngine::new(registry.clone(), gateway, sink.clone()));
        (engine, registry, sink)
    }

    fn auth() -> MusicAuth {
        MusicAuth {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at_ms: now_ms() + 3_600_000,
            user_id: "u1".into(),
        }
    }

    #[tokio::test]
    async fn start_game_rejects_non_host_caller() {
        let (engine, registry, _sink) = test_engine();
        let (shared, host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();
        let outcome = registry.join_room(&code, "guest".into(), ConnectionId::new()).await.unwrap();
        assert_ne!(outcome.player_id, host_id);

        let err = engine.start_game(&code, &outcome.player_id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn start_game_requires_music_auth_and_playlist() {
        let (engine, registry, _sink) = test_engine();
        let (shared, host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();
        registry.join_room(&code, "guest".into(), ConnectionId::new()).await.unwrap();

        let err = engine.start_game(&code, &host_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn submit_answer_rejected_outside_playing_status() {
        let (engine, registry, _sink) = test_engine();
        let (shared, host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();

        let err = engine
            .submit_answer(&code, &host_id, "title".into(), "artist".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn set_music_auth_rejects_non_host_caller() {
        let (engine, registry, _sink) = test_engine();
        let (shared, host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();
        let outcome = registry.join_room(&code, "guest".into(), ConnectionId::new()).await.unwrap();
        assert_ne!(outcome.player_id, host_id);

        let err = engine
            .set_music_auth(&code, &outcome.player_id, "at".into(), "rt".into(), 3600)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn load_playlist_enforces_cooldown() {
        let (engine, registry, _sink) = test_engine();
        let (shared, host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();
        {
            let mut room = shared.lock().await;
            room.music_auth = Some(auth());
            room.last_playlist_load_ms = Some(now_ms());
        }

        let err = engine
            .load_playlist(&code, &host_id, "37i9dQZF1DXcBWIGoYBM5M")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn end_round_is_a_no_op_while_paused() {
        let (engine, registry, _sink) = test_engine();
        let (shared, _host_id) = registry.create_room("host".into(), ConnectionId::new()).unwrap();
        let code = shared.lock().await.code.0.clone();

        {
            let mut room = shared.lock().await;
            room.game_state.status = GameStatus::Playing;
            room.game_state.is_paused = true;
            room.game_state.current_round = 1;
        }

        engine.end_round(&code).await;

        let room = shared.lock().await;
        assert_eq!(room.game_state.status, GameStatus::Playing);
    }

    #[test]
    fn final_standing_orders_winner_first_then_survivors_then_later_eliminations() {
        let winner = PlayerId::new();
        let survivor = PlayerId::new();
        let early_out = PlayerId::new();
        let late_out = PlayerId::new();
        let winner_id = Some(winner.clone());

        let mut standings = vec![
            FinalStanding {
                player_id: early_out.clone(),
                nickname: "early".into(),
                pace: 8,
                is_eliminated: true,
                eliminated_round: Some(6),
            },
            FinalStanding {
                player_id: late_out.clone(),
                nickname: "late".into(),
                pace: 2,
                is_eliminated: true,
                eliminated_round: Some(12),
            },
            FinalStanding {
                player_id: survivor.clone(),
                nickname: "survivor".into(),
                pace: 9,
                is_eliminated: false,
                eliminated_round: None,
            },
            FinalStanding {
                player_id: winner.clone(),
                nickname: "winner".into(),
                pace: 10,
                is_eliminated: false,
                eliminated_round: None,
            },
        ];

        standings.sort_by(|a, b| compare_final_standing(a, b, &winner_id));

        let order: Vec<PlayerId> = standings.into_iter().map(|s| s.player_id).collect();
        assert_eq!(order, vec![winner, survivor, late_out, early_out]);
    }
}
