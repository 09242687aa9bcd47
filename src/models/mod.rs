//! Domain types shared by every other module: rooms, players, game state,
//! tracks, music auth, and the wire event protocol.

pub mod events;
pub mod game_state;
pub mod ids;
pub mod music_auth;
pub mod player;
pub mod room;
pub mod track;

pub use events::{ClientEvent, ErrorCode, FinalStanding, RoundResult, ServerEvent};
pub use game_state::{GameState, GameStatus, PauseReason};
pub use ids::{ConnectionId, PlayerId, RoomCode, TrackId, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
pub use music_auth::MusicAuth;
pub use player::{CurrentAnswer, Player, ScoringClass};
pub use room::{Room, RoomSettings, RoomView};
pub use track::{Artist, PlaylistInfo, Track};
