//! Client for the external music catalog service: OAuth lifecycle,
//! playlist metadata, and random-track selection (spec §4.2).

mod client;
mod error;
mod playlist_id;

pub use client::MusicGateway;
pub use error::GatewayError;
pub use playlist_id::parse_playlist_id;
