//! The small broadcast/direct-send surface the Engine and Registry use.
//! Only the Dispatcher knows about live connections (spec §4.5); this
//! trait is how the Engine reaches it without depending on transport
//! internals.

use crate::models::{ConnectionId, ServerEvent};

pub trait EventSink: Send + Sync {
    fn broadcast_room(&self, room_code: &str, event: ServerEvent);
    fn send_to_connection(&self, connection_id: &ConnectionId, event: ServerEvent);
}
