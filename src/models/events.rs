//! The bidirectional event protocol (spec §6). Every inbound frame
//! deserializes into `ClientEvent`; every frame the server emits is a
//! `ServerEvent`. Both are externally tagged on `"type"` with fields
//! flattened alongside it, matching a plain `{"type": "...", ...}` wire
//! message rather than a nested envelope.

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::player::{Player, ScoringClass};
use super::room::RoomView;
use super::track::{PlaylistInfo, Track};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    CreateRoom { nickname: String },
    JoinRoom { room_code: String, nickname: String },
    LeaveRoom {},
    StartGame {},
    SubmitAnswer { song_title: String, artist: String },
    RestartGame {},
    SetMusicAuth {
        access_token: String,
        refresh_token: String,
        expires_in: i64,
    },
    LoadPlaylist { playlist_id: String },
    PlaybackReady {},
    PlaybackEnded {},
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub player_id: PlayerId,
    pub nickname: String,
    pub song_correct: Option<bool>,
    pub artist_correct: Option<bool>,
    pub result: ScoringClass,
    pub new_pace: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStanding {
    pub player_id: PlayerId,
    pub nickname: String,
    pub pace: i32,
    pub is_eliminated: bool,
    pub eliminated_round: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackCommandKind {
    Play,
    Stop,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    InvalidState,
    Gateway,
    RateLimited,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    RoomJoined { room: RoomView, player_id: PlayerId },
    RoomUpdated { room: RoomView },
    PlayerJoined { player: Player },
    PlayerLeft { player_id: PlayerId, nickname: String },
    PlayerReconnected { player_id: PlayerId, nickname: String },

    GameStarting { starts_in: u64 },
    RoundStarted {
        round_number: u32,
        duration_ms: u64,
        track_uri: String,
    },
    PlayerSubmitted { player_id: PlayerId, nickname: String },
    RoundEnded {
        track: Track,
        results: Vec<RoundResult>,
        next_round_in: u64,
    },
    EliminationCheck {
        round: u32,
        threshold: i32,
        leader_pace: i32,
        eliminated: Vec<PlayerId>,
        survivors: Vec<PlayerId>,
    },
    GameOver {
        winner_id: Option<PlayerId>,
        winner_nickname: Option<String>,
        final_standings: Vec<FinalStanding>,
    },
    GamePaused { reason: String },
    GameResumed {},

    MusicConnected { user_id: String },
    PlaylistLoaded { playlist: PlaylistInfo, track_count: u32 },
    PlaybackCommand {
        command: PlaybackCommandKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        track_uri: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position_ms: Option<u64>,
    },

    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error { message: message.into(), code: None }
    }

    pub fn error_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        ServerEvent::Error { message: message.into(), code: Some(code) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_deserialize_from_camel_case_field_names() {
        let join: ClientEvent =
            serde_json::from_str(r#"{"type":"joinRoom","roomCode":"AB3D","nickname":"Alice"}"#)
                .unwrap();
        assert!(matches!(join, ClientEvent::JoinRoom { room_code, nickname }
            if room_code == "AB3D" && nickname == "Alice"));

        let submit: ClientEvent = serde_json::from_str(
            r#"{"type":"submitAnswer","songTitle":"Yesterday","artist":"The Beatles"}"#,
        )
        .unwrap();
        assert!(matches!(submit, ClientEvent::SubmitAnswer { song_title, artist }
            if song_title == "Yesterday" && artist == "The Beatles"));

        let auth: ClientEvent = serde_json::from_str(
            r#"{"type":"setMusicAuth","accessToken":"at","refreshToken":"rt","expiresIn":3600}"#,
        )
        .unwrap();
        assert!(matches!(
            auth,
            ClientEvent::SetMusicAuth { access_token, refresh_token, expires_in }
                if access_token == "at" && refresh_token == "rt" && expires_in == 3600
        ));

        let load: ClientEvent =
            serde_json::from_str(r#"{"type":"loadPlaylist","playlistId":"abc123"}"#).unwrap();
        assert!(matches!(load, ClientEvent::LoadPlaylist { playlist_id } if playlist_id == "abc123"));
    }

    #[test]
    fn server_events_serialize_with_camel_case_field_names() {
        let event = ServerEvent::RoundStarted {
            round_number: 3,
            duration_ms: 60_000,
            track_uri: "uri:track:1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "roundStarted");
        assert_eq!(json["roundNumber"], 3);
        assert_eq!(json["durationMs"], 60_000);
        assert_eq!(json["trackUri"], "uri:track:1");
        assert!(json.get("round_number").is_none());

        let game_over = ServerEvent::GameOver {
            winner_id: Some(PlayerId("p1".into())),
            winner_nickname: Some("Alice".into()),
            final_standings: vec![FinalStanding {
                player_id: PlayerId("p1".into()),
                nickname: "Alice".into(),
                pace: 10,
                is_eliminated: false,
                eliminated_round: None,
            }],
        };
        let json = serde_json::to_value(&game_over).unwrap();
        assert_eq!(json["winnerId"], "p1");
        assert_eq!(json["winnerNickname"], "Alice");
        assert_eq!(json["finalStandings"][0]["isEliminated"], false);
        assert_eq!(json["finalStandings"][0]["playerId"], "p1");
        assert!(json["finalStandings"][0].get("is_eliminated").is_none());
    }

    #[test]
    fn round_result_serializes_with_camel_case_field_names() {
        let result = RoundResult {
            player_id: PlayerId("p1".into()),
            nickname: "Alice".into(),
            song_correct: Some(true),
            artist_correct: Some(true),
            result: ScoringClass::Both,
            new_pace: 10,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["songCorrect"], true);
        assert_eq!(json["artistCorrect"], true);
        assert_eq!(json["newPace"], 10);
        assert!(json.get("song_correct").is_none());
    }
}
