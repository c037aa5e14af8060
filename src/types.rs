use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// OAuth token bundle kept in the user's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is no longer valid.
    pub expires_at: i64,
    pub scope: BTreeSet<String>,
}

impl Token {
    /// A token is valid strictly before `expires_at`; the boundary itself is expired.
    pub fn is_valid_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && now < self.expires_at
    }
}

/// Raw response of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// One page of a limit/offset paged endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            limit: None,
            offset: None,
        }
    }

    pub fn has_more(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistMeta {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// `album` and `artists` may be missing or null for local files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub artists: Option<Vec<Artist>>,
}

/// Entry of the saved tracks ("Liked Songs") and playlist items endpoints.
///
/// `track` is null for removed or local playlist entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub track: Option<Track>,
}

/// Display projection of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub name: String,
    pub album_name: String,
    pub artist_names: Vec<String>,
}

impl From<Track> for TrackRow {
    fn from(track: Track) -> Self {
        TrackRow {
            name: track.name,
            album_name: track.album.unwrap_or_default().name,
            artist_names: track
                .artists
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.name)
                .collect(),
        }
    }
}
