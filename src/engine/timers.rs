//! Per-room round/reveal timer handles.
//!
//! Held outside `Room` itself since `tokio::task::JoinHandle` isn't part of
//! the room's plain data; cancellation is best-effort per spec §5, so every
//! timer callback re-validates room status under the lock before acting.

use dashmap::DashMap;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct RoomTimers {
    round: DashMap<String, JoinHandle<()>>,
    reveal: DashMap<String, JoinHandle<()>>,
}

impl RoomTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_round(&self, room_code: &str, handle: JoinHandle<()>) {
        if let Some((_, old)) = self.round.remove(room_code) {
            old.abort();
        }
        self.round.insert(room_code.to_string(), handle);
    }

    pub fn arm_reveal(&self, room_code: &str, handle: JoinHandle<()>) {
        if let Some((_, old)) = self.reveal.remove(room_code) {
            old.abort();
        }
        self.reveal.insert(room_code.to_string(), handle);
    }

    pub fn cancel_round(&self, room_code: &str) {
        if let Some((_, handle)) = self.round.remove(room_code) {
            handle.abort();
        }
    }

    pub fn cancel_reveal(&self, room_code: &str) {
        if let Some((_, handle)) = self.reveal.remove(room_code) {
            handle.abort();
        }
    }

    pub fn cancel_all(&self, room_code: &str) {
        self.cancel_round(room_code);
        self.cancel_reveal(room_code);
    }
}
