//! Connection presence: per-connection unicast channels and per-room
//! broadcast groups (spec §4.5 — "the Dispatcher is the only component
//! that knows about connections").
//!
//! Shaped after the `ws-rooms` reference registry's concurrent outer map
//! plus reverse index, but the reverse index here is implicit: a
//! connection only ever needs its own unicast sender removed on
//! disconnect, not membership bookkeeping, since room membership lives in
//! the Registry.

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};

use crate::engine::EventSink;
use crate::models::{ConnectionId, ServerEvent};

const ROOM_BROADCAST_CAPACITY: usize = 256;

pub struct ConnectionHub {
    rooms: DashMap<String, broadcast::Sender<ServerEvent>>,
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self { rooms: DashMap::new(), connections: DashMap::new() }
    }

    pub fn register_connection(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(id, tx);
        rx
    }

    pub fn remove_connection(&self, id: &ConnectionId) {
        self.connections.remove(id);
    }

    /// Subscribes the caller to a room-scoped broadcast group, creating it
    /// on first use.
    pub fn subscribe_room(&self, room_code: &str) -> broadcast::Receiver<ServerEvent> {
        self.rooms
            .entry(room_code.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drops a room's broadcast group once the Registry has deleted the
    /// room, so the channel doesn't linger for the life of the process.
    pub fn remove_room(&self, room_code: &str) {
        self.rooms.remove(room_code);
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConnectionHub {
    fn broadcast_room(&self, room_code: &str, event: ServerEvent) {
        if let Some(sender) = self.rooms.get(room_code) {
            // No receivers is a normal transient state (e.g. between a
            // room's creation and the creator's broadcast subscription).
            let _ = sender.send(event);
        }
    }

    fn send_to_connection(&self, connection_id: &ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(connection_id) {
            let _ = sender.send(event);
        }
    }
}
