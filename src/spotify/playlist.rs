use crate::{
    error::RemoteError,
    spotify::SpotifyClient,
    types::{Page, Playlist, PlaylistMeta, TrackItem},
};

impl SpotifyClient {
    /// Retrieves one page of the playlists owned or followed by the user.
    ///
    /// # API Endpoint
    ///
    /// `GET /me/playlists?limit={limit}&offset={offset}`
    pub async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, RemoteError> {
        self.get_json(
            "/me/playlists",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    /// Fetches playlist metadata. Only the name is requested.
    pub async fn playlist(&self, playlist_id: &str) -> Result<PlaylistMeta, RemoteError> {
        self.get_json(
            &format!("/playlists/{}", playlist_id),
            &[("fields", "name".to_string())],
        )
        .await
    }

    /// Retrieves one page of a playlist's items.
    ///
    /// Episodes and local files come back with a null or partial `track`;
    /// only tracks are requested.
    ///
    /// # API Endpoint
    ///
    /// `GET /playlists/{playlist_id}/tracks?limit={limit}&offset={offset}`
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<TrackItem>, RemoteError> {
        self.get_json(
            &format!("/playlists/{}/tracks", playlist_id),
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("additional_types", "track".to_string()),
            ],
        )
        .await
    }
}
