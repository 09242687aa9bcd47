//! Opaque identifier newtypes.
//!
//! The source treats room codes, player ids, connection ids and track ids
//! as plain strings; wrapping them here keeps handler signatures from
//! accidentally swapping one kind of id for another.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Room code alphabet: uppercase letters and digits, excluding characters
/// that are easy to misread (no I, O, 0, 1).
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Case-insensitive lookup key.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(PlayerId);
uuid_id!(ConnectionId);
uuid_id!(TrackId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_code_normalizes_case_insensitively() {
        let code = RoomCode("ab3d".to_string());
        assert_eq!(code.normalized(), "AB3D");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(PlayerId::new(), PlayerId::new());
    }
}
