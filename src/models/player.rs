//! Player record.

use serde::{Deserialize, Serialize};

use super::ids::{ConnectionId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoringClass {
    Both,
    One,
    None,
}

impl ScoringClass {
    /// Pace delta applied for a round scored in this class.
    pub fn pace_delta(self) -> i32 {
        match self {
            ScoringClass::Both => 1,
            ScoringClass::One => 0,
            ScoringClass::None => -3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAnswer {
    pub song_title: String,
    pub artist: String,
    pub submitted_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub pace: i32,
    pub is_host: bool,
    pub is_eliminated: bool,
    pub is_connected: bool,
    pub has_submitted: bool,
    /// Server-internal only: the raw submitted text is scored by the Engine
    /// but no wire event ever exposes it — `playerSubmitted` carries only
    /// the nickname, and `roundEnded`'s `RoundResult` carries only
    /// correctness booleans (spec §6). Skipped from serialization so it
    /// can never leak to other players via a `roomUpdated`/`roomJoined`
    /// broadcast mid-round.
    #[serde(skip)]
    pub current_answer: Option<CurrentAnswer>,
    pub last_round_result: Option<ScoringClass>,
    /// Server-internal transport handle; never part of the client-facing
    /// protocol (spec §6 player fields are id/nickname/pace/flags only).
    #[serde(skip)]
    pub connection_id: Option<ConnectionId>,
    /// Round number at which this player was eliminated, for final-standing order.
    pub eliminated_round: Option<u32>,
}

pub const STARTING_PACE: i32 = 10;
pub const MIN_PACE: i32 = 0;
pub const MAX_PACE: i32 = 10;

impl Player {
    pub fn new(id: PlayerId, nickname: String, is_host: bool, connection_id: ConnectionId) -> Self {
        Self {
            id,
            nickname,
            pace: STARTING_PACE,
            is_host,
            is_eliminated: false,
            is_connected: true,
            has_submitted: false,
            current_answer: None,
            last_round_result: None,
            connection_id: Some(connection_id),
            eliminated_round: None,
        }
    }

    /// Reset to game-start state: full pace, not eliminated, no answer.
    pub fn reset_for_new_game(&mut self) {
        self.pace = STARTING_PACE;
        self.is_eliminated = false;
        self.has_submitted = false;
        self.current_answer = None;
        self.last_round_result = None;
        self.eliminated_round = None;
    }

    /// Reset per-round fields before a new round starts.
    pub fn reset_for_new_round(&mut self) {
        self.has_submitted = false;
        self.current_answer = None;
        self.last_round_result = None;
    }

    pub fn apply_pace_delta(&mut self, delta: i32) {
        self.pace = (self.pace + delta).clamp(MIN_PACE, MAX_PACE);
    }

    /// Active means eligible to submit/win: connected and not eliminated.
    pub fn is_active(&self) -> bool {
        self.is_connected && !self.is_eliminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_clamps_at_upper_bound() {
        let mut p = Player::new(PlayerId::new(), "A".into(), true, ConnectionId::new());
        p.pace = 10;
        p.apply_pace_delta(1);
        assert_eq!(p.pace, 10);
    }

    #[test]
    fn pace_clamps_at_lower_bound() {
        let mut p = Player::new(PlayerId::new(), "A".into(), true, ConnectionId::new());
        p.pace = 2;
        p.apply_pace_delta(-3);
        assert_eq!(p.pace, 0);
    }
}
