//! Track, artist and playlist metadata as returned by the music catalog.

use serde::{Deserialize, Serialize};

use super::ids::TrackId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    /// Opaque playback URI handed to the host's playback client.
    pub uri: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album_name: String,
    pub album_cover_url: Option<String>,
    pub duration_ms: u32,
    pub preview_url: Option<String>,
    /// True for a locally-uploaded file the catalog can't stream back.
    #[serde(default)]
    pub is_local: bool,
}

impl Track {
    /// Strips the fields that would let a client learn the answer before
    /// the reveal phase (spec §4.4: "title and artist are never sent to
    /// clients" while `roundStarted` is the active broadcast). Keeps the
    /// id/uri/duration the host's playback client and UI timers need.
    pub fn redacted(&self) -> Track {
        Track {
            id: self.id.clone(),
            uri: self.uri.clone(),
            name: String::new(),
            artists: Vec::new(),
            album_name: String::new(),
            album_cover_url: None,
            duration_ms: self.duration_ms,
            preview_url: None,
            is_local: self.is_local,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub cover_url: Option<String>,
    pub total_tracks: u32,
}
