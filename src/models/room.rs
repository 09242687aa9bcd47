//! Room: the unit of concurrency. Each room is guarded by its own lock in
//! the registry (see `crate::registry`); this module only defines the data.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::game_state::GameState;
use super::ids::{PlayerId, RoomCode, TrackId};
use super::music_auth::MusicAuth;
use super::player::Player;
use super::track::PlaylistInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub max_players: usize,
    pub round_duration_ms: u64,
    pub reveal_duration_ms: u64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 10,
            round_duration_ms: 60_000,
            reveal_duration_ms: 8_000,
        }
    }
}

/// A room's full mutable state. Lives behind `Arc<tokio::sync::Mutex<Room>>`
/// in the registry so every transition for a given room is linearized.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub host_id: PlayerId,
    /// Insertion order preserved for deterministic host succession.
    pub player_order: Vec<PlayerId>,
    pub players: HashMap<PlayerId, Player>,
    pub game_state: GameState,
    pub music_auth: Option<MusicAuth>,
    pub playlist: Option<PlaylistInfo>,
    pub used_track_ids: HashSet<TrackId>,
    pub created_at_ms: i64,
    pub settings: RoomSettings,
    pub last_playlist_load_ms: Option<i64>,
}

impl Room {
    pub fn new(code: RoomCode, host: Player, now_ms: i64) -> Self {
        let host_id = host.id.clone();
        let mut players = HashMap::new();
        players.insert(host_id.clone(), host);
        Self {
            code,
            host_id,
            player_order: vec![players.keys().next().unwrap().clone()],
            players,
            game_state: GameState::default(),
            music_auth: None,
            playlist: None,
            used_track_ids: HashSet::new(),
            created_at_ms: now_ms,
            settings: RoomSettings::default(),
            last_playlist_load_ms: None,
        }
    }

    pub fn connected_player_count(&self) -> usize {
        self.players.values().filter(|p| p.is_connected).count()
    }

    /// Players eligible to submit and to be counted toward winning: connected and not eliminated.
    pub fn active_players(&self) -> Vec<&Player> {
        self.player_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|p| p.is_active())
            .collect()
    }

    pub fn players_in_order(&self) -> Vec<&Player> {
        self.player_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .collect()
    }

    /// Promote the first remaining player (insertion order) to host.
    pub fn promote_next_host(&mut self) {
        if let Some(next_id) = self.player_order.first().cloned() {
            self.host_id = next_id.clone();
            if let Some(p) = self.players.get_mut(&next_id) {
                p.is_host = true;
            }
        }
    }

    pub fn find_player_by_nickname(&self, nickname: &str) -> Option<PlayerId> {
        self.player_order.iter().find_map(|id| {
            self.players.get(id).and_then(|p| {
                p.nickname.eq_ignore_ascii_case(nickname).then(|| id.clone())
            })
        })
    }
}

/// Outbound projection of a room. Never carries tokens or the used-track set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub code: String,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    pub game_state: GameState,
    pub has_music_auth: bool,
    pub playlist: Option<PlaylistInfo>,
    pub settings: RoomSettings,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        let mut game_state = room.game_state.clone();
        if game_state.status == super::game_state::GameStatus::Playing {
            if let Some(track) = game_state.current_track.as_mut() {
                *track = track.redacted();
            }
        }
        Self {
            code: room.code.0.clone(),
            host_id: room.host_id.clone(),
            players: room.players_in_order().into_iter().cloned().collect(),
            game_state,
            has_music_auth: room.music_auth.is_some(),
            playlist: room.playlist.clone(),
            settings: room.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::game_state::GameStatus;
    use super::super::ids::ConnectionId;
    use super::super::track::{Artist, Track};

    fn sample_track() -> Track {
        Track {
            id: TrackId("t1".into()),
            uri: "spotify:track:t1".into(),
            name: "Bohemian Rhapsody".into(),
            artists: vec![Artist { id: "a1".into(), name: "Queen".into() }],
            album_name: "A Night at the Opera".into(),
            album_cover_url: Some("https://example.com/cover.jpg".into()),
            duration_ms: 354_000,
            preview_url: Some("https://example.com/preview.mp3".into()),
            is_local: false,
        }
    }

    #[test]
    fn room_view_redacts_track_title_and_artist_while_playing() {
        let host = Player::new(PlayerId::new(), "host".into(), true, ConnectionId::new());
        let mut room = Room::new(RoomCode("ABCD".into()), host, 0);
        room.game_state.status = GameStatus::Playing;
        room.game_state.current_track = Some(sample_track());

        let view = RoomView::from(&room);
        let track = view.game_state.current_track.expect("track present");
        assert_eq!(track.name, "");
        assert!(track.artists.is_empty());
        assert_eq!(track.uri, "spotify:track:t1");
    }

    #[test]
    fn room_view_keeps_full_track_during_reveal() {
        let host = Player::new(PlayerId::new(), "host".into(), true, ConnectionId::new());
        let mut room = Room::new(RoomCode("ABCD".into()), host, 0);
        room.game_state.status = GameStatus::RoundReveal;
        room.game_state.current_track = Some(sample_track());

        let view = RoomView::from(&room);
        let track = view.game_state.current_track.expect("track present");
        assert_eq!(track.name, "Bohemian Rhapsody");
    }
}
