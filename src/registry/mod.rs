//! Process-wide room registry (spec §4.3): a table of rooms keyed by
//! 4-character code, with reverse indices from player id and connection id.
//!
//! Modeled on the concurrent-outer-map-plus-reverse-index shape in the
//! `ws-rooms` reference registry (room name -> connections, connection ->
//! rooms), generalized from "connections in a room" to the three indices
//! spec.md §3 requires (room code, player id, connection id), each further
//! guarded by its own `tokio::sync::Mutex<Room>` for the per-room
//! linearizability spec.md §5 mandates.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use rand::Rng;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::{ConnectionId, Player, PlayerId, Room, RoomCode, RoomView, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};

const STALE_ROOM_AGE_MS: i64 = 24 * 60 * 60 * 1000;
const ROOM_CODE_GENERATION_ATTEMPTS: u32 = 100;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("connection is not bound to a room")]
    UnboundConnection,
    #[error("room is full")]
    RoomFull,
    #[error("room has already started")]
    RoomNotJoinable,
    #[error("could not allocate a unique room code")]
    CodeExhausted,
}

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_millis() as i64
}

pub type SharedRoom = Arc<Mutex<Room>>;

/// The three mutually-consistent indices spec.md §3 names, plus the locked
/// room states they point into.
pub struct Registry {
    rooms: DashMap<String, SharedRoom>,
    player_to_room: DashMap<PlayerId, String>,
    connection_to_player: DashMap<ConnectionId, PlayerId>,
}

pub struct JoinOutcome {
    pub room: SharedRoom,
    pub player_id: PlayerId,
    pub is_rejoin: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            player_to_room: DashMap::new(),
            connection_to_player: DashMap::new(),
        }
    }

    fn generate_code(&self) -> Result<RoomCode, RegistryError> {
        let mut rng = rand::thread_rng();
        for _ in 0..ROOM_CODE_GENERATION_ATTEMPTS {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| {
                    let idx = rng.gen_range(0..ROOM_CODE_ALPHABET.len());
                    ROOM_CODE_ALPHABET[idx] as char
                })
                .collect();
            if !self.rooms.contains_key(&code) {
                return Ok(RoomCode(code));
            }
        }
        Err(RegistryError::CodeExhausted)
    }

    pub fn create_room(
        &self,
        nickname: String,
        connection_id: ConnectionId,
    ) -> Result<(SharedRoom, PlayerId), RegistryError> {
        let code = self.generate_code()?;
        let player_id = PlayerId::new();
        let host = Player::new(player_id.clone(), nickname, true, connection_id.clone());

        let room = Room::new(code.clone(), host, now_ms());
        let shared = Arc::new(Mutex::new(room));

        self.rooms.insert(code.0.clone(), shared.clone());
        self.player_to_room.insert(player_id.clone(), code.0.clone());
        self.connection_to_player.insert(connection_id, player_id.clone());

        info!(room_code = %code, %player_id, "room created");
        Ok((shared, player_id))
    }

    /// Case-insensitive code lookup.
    pub fn get_room(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.get(&code.to_ascii_uppercase()).map(|r| r.clone())
    }

    pub fn get_room_by_connection(&self, connection_id: &ConnectionId) -> Option<SharedRoom> {
        let player_id = self.connection_to_player.get(connection_id)?.clone();
        let room_code = self.player_to_room.get(&player_id)?.clone();
        self.get_room(&room_code)
    }

    pub fn get_player_by_connection(&self, connection_id: &ConnectionId) -> Option<PlayerId> {
        self.connection_to_player.get(connection_id).map(|p| p.clone())
    }

    /// Joins an existing room, treating a matching nickname as a rejoin.
    /// Must be called with the room's lock already acquired by the caller
    /// via `get_room` + `.lock().await`, since admission depends on room
    /// status and player count under that lock.
    pub async fn join_room(
        &self,
        code: &str,
        nickname: String,
        connection_id: ConnectionId,
    ) -> Result<JoinOutcome, RegistryError> {
        let shared = self
            .get_room(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.to_string()))?;

        let (player_id, room_code, is_rejoin) = {
            let mut room = shared.lock().await;

            if let Some(existing_id) = room.find_player_by_nickname(&nickname) {
                if let Some(player) = room.players.get_mut(&existing_id) {
                    player.is_connected = true;
                    player.connection_id = Some(connection_id.clone());
                }
                (existing_id, room.code.0.clone(), true)
            } else {
                use crate::models::GameStatus;
                // Disconnected players still hold their slot until an explicit
                // leave, so capacity is measured against the full roster, not
                // just who's currently connected.
                if room.players.len() >= room.settings.max_players {
                    return Err(RegistryError::RoomFull);
                }
                if room.game_state.status != GameStatus::Lobby {
                    return Err(RegistryError::RoomNotJoinable);
                }

                let player_id = PlayerId::new();
                let player = Player::new(player_id.clone(), nickname, false, connection_id.clone());
                room.players.insert(player_id.clone(), player);
                room.player_order.push(player_id.clone());
                (player_id, room.code.0.clone(), false)
            }
        };

        self.player_to_room.insert(player_id.clone(), room_code);
        self.connection_to_player.insert(connection_id, player_id.clone());

        Ok(JoinOutcome { room: shared, player_id, is_rejoin })
    }

    /// Marks the bound player disconnected; never removes the record.
    /// Returns the room and whether a host-disconnect pause was applied,
    /// for the caller to broadcast.
    pub async fn handle_disconnect(&self, connection_id: &ConnectionId) -> Option<(SharedRoom, PlayerId)> {
        let player_id = self.connection_to_player.remove(connection_id)?.1;
        let room_code = self.player_to_room.get(&player_id)?.clone();
        let shared = self.get_room(&room_code)?;

        {
            use crate::models::{GameStatus, PauseReason};
            let mut room = shared.lock().await;
            if let Some(player) = room.players.get_mut(&player_id) {
                player.is_connected = false;
                player.connection_id = None;
            }
            if room.host_id == player_id && room.game_state.status == GameStatus::Playing {
                room.game_state.is_paused = true;
                room.game_state.pause_reason = Some(PauseReason::HostDisconnected);
            }
        }

        Some((shared, player_id))
    }

    /// Explicit leave: removes the player record. Deletes the room if it
    /// becomes empty; otherwise promotes the next host by insertion order.
    pub async fn remove_player(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(String, PlayerId, bool)> {
        let player_id = self.connection_to_player.remove(connection_id)?.1;
        let room_code = self.player_to_room.remove(&player_id)?.1;
        let shared = self.get_room(&room_code)?;

        let room_deleted = {
            let mut room = shared.lock().await;
            room.players.remove(&player_id);
            room.player_order.retain(|id| id != &player_id);

            if room.players.is_empty() {
                true
            } else {
                if room.host_id == player_id {
                    room.promote_next_host();
                }
                false
            }
        };

        if room_deleted {
            self.rooms.remove(&room_code);
            info!(room_code, "room deleted after last player left");
        }

        Some((room_code, player_id, room_deleted))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub async fn serialize_room(&self, shared: &SharedRoom) -> RoomView {
        let room = shared.lock().await;
        RoomView::from(&*room)
    }

    /// Deletes rooms with no connected players whose age exceeds 24 hours,
    /// cleaning every index. Invoked on a 1-hour interval. Returns the codes
    /// of rooms removed, so the caller can also drop their broadcast groups.
    pub async fn sweep(&self) -> Vec<String> {
        let mut stale_codes = Vec::new();
        let current = now_ms();

        for entry in self.rooms.iter() {
            let room = entry.value().lock().await;
            let age_ms = current - room.created_at_ms;
            if room.connected_player_count() == 0 && age_ms > STALE_ROOM_AGE_MS {
                stale_codes.push((entry.key().clone(), room.players.keys().cloned().collect::<Vec<_>>()));
            }
        }

        let mut removed = Vec::with_capacity(stale_codes.len());
        for (code, player_ids) in stale_codes {
            self.rooms.remove(&code);
            for player_id in &player_ids {
                self.player_to_room.remove(player_id);
            }
            self.connection_to_player
                .retain(|_, bound_player| !player_ids.contains(bound_player));
            warn!(room_code = %code, "swept stale room");
            removed.push(code);
        }
        removed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_join_keeps_indices_consistent() {
        let registry = Registry::new();
        let (room, host_id) = registry
            .create_room("host".to_string(), ConnectionId::new())
            .unwrap();
        let code = room.lock().await.code.0.clone();

        let outcome = registry
            .join_room(&code, "guest".to_string(), ConnectionId::new())
            .await
            .unwrap();

        assert_ne!(outcome.player_id, host_id);
        assert!(!outcome.is_rejoin);
        assert_eq!(registry.get_room(&code).unwrap().lock().await.players.len(), 2);
    }

    #[tokio::test]
    async fn rejoin_by_nickname_reuses_player_id() {
        let registry = Registry::new();
        let (room, _host_id) = registry
            .create_room("host".to_string(), ConnectionId::new())
            .unwrap();
        let code = room.lock().await.code.0.clone();

        let first_connection = ConnectionId::new();
        let first_join = registry
            .join_room(&code, "Guest".to_string(), first_connection.clone())
            .await
            .unwrap();

        registry.handle_disconnect(&first_connection).await;

        let second_join = registry
            .join_room(&code, "guest".to_string(), ConnectionId::new())
            .await
            .unwrap();

        assert_eq!(first_join.player_id, second_join.player_id);
        assert!(second_join.is_rejoin);
    }

    #[tokio::test]
    async fn removing_last_player_deletes_room() {
        let registry = Registry::new();
        let connection_id = ConnectionId::new();
        let (room, _host_id) = registry
            .create_room("host".to_string(), connection_id.clone())
            .unwrap();
        let code = room.lock().await.code.0.clone();

        let (removed_code, _player_id, deleted) = registry.remove_player(&connection_id).await.unwrap();
        assert_eq!(removed_code, code);
        assert!(deleted);
        assert!(registry.get_room(&code).is_none());
    }

    /// spec.md §8: "For all sequences of create/join/leave/disconnect on a
    /// fresh registry, the three indices remain mutually consistent and the
    /// 'exactly one host per non-empty room' invariant holds." Runs many
    /// random op sequences rather than one fixed scenario, since the
    /// invariant is claimed over *all* sequences.
    #[tokio::test]
    async fn random_sequences_keep_indices_consistent_and_exactly_one_host() {
        #[derive(Clone, Copy)]
        enum Op {
            Create,
            Join,
            Leave,
            Disconnect,
        }

        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let registry = Registry::new();
            let mut connections: Vec<ConnectionId> = Vec::new();
            let mut room_codes: Vec<String> = Vec::new();

            for step in 0..40 {
                let op = match rng.gen_range(0..4) {
                    0 => Op::Create,
                    1 => Op::Join,
                    2 => Op::Leave,
                    _ => Op::Disconnect,
                };

                match op {
                    Op::Create => {
                        let conn = ConnectionId::new();
                        if let Ok((room, _host_id)) =
                            registry.create_room(format!("host-{step}"), conn.clone())
                        {
                            let code = room.lock().await.code.0.clone();
                            room_codes.push(code);
                            connections.push(conn);
                        }
                    }
                    Op::Join => {
                        if room_codes.is_empty() {
                            continue;
                        }
                        let code = room_codes[rng.gen_range(0..room_codes.len())].clone();
                        let conn = ConnectionId::new();
                        if registry
                            .join_room(&code, format!("guest-{step}"), conn.clone())
                            .await
                            .is_ok()
                        {
                            connections.push(conn);
                        }
                    }
                    Op::Leave => {
                        if connections.is_empty() {
                            continue;
                        }
                        let idx = rng.gen_range(0..connections.len());
                        let conn = connections.remove(idx);
                        if let Some((code, _player_id, deleted)) =
                            registry.remove_player(&conn).await
                        {
                            if deleted {
                                room_codes.retain(|c| c != &code);
                            }
                        }
                    }
                    Op::Disconnect => {
                        if connections.is_empty() {
                            continue;
                        }
                        let idx = rng.gen_range(0..connections.len());
                        let conn = connections[idx].clone();
                        registry.handle_disconnect(&conn).await;
                    }
                }

                // Invariant: every remaining non-empty room has exactly one host.
                for code in &room_codes {
                    if let Some(shared) = registry.get_room(code) {
                        let room = shared.lock().await;
                        if !room.players.is_empty() {
                            let host_count =
                                room.players.values().filter(|p| p.is_host).count();
                            assert_eq!(
                                host_count, 1,
                                "room {code} has {host_count} hosts, expected exactly 1"
                            );
                            assert!(
                                room.players.contains_key(&room.host_id),
                                "host_id must point at a player in the room"
                            );
                        }
                    }
                }
            }
        }
    }
}
