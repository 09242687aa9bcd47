//! Room-wide game state machine status.

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Lobby,
    Starting,
    Playing,
    RoundReveal,
    EliminationCheck,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    HostDisconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    pub current_round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_track: Option<Track>,
    pub round_start_time_ms: i64,
    pub round_end_time_ms: i64,
    pub is_paused: bool,
    pub pause_reason: Option<PauseReason>,
    pub winner_id: Option<PlayerId>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            status: GameStatus::Lobby,
            current_round: 0,
            current_track: None,
            round_start_time_ms: 0,
            round_end_time_ms: 0,
            is_paused: false,
            pause_reason: None,
            winner_id: None,
        }
    }
}
