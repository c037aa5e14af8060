use crate::{
    error::RemoteError,
    spotify::SpotifyClient,
    types::{Page, TrackItem},
};

impl SpotifyClient {
    /// Retrieves one page of the user's saved tracks ("Liked Songs").
    ///
    /// # Arguments
    ///
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first item to return
    ///
    /// # API Endpoint
    ///
    /// `GET /me/tracks?limit={limit}&offset={offset}`
    pub async fn current_user_saved_tracks(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<TrackItem>, RemoteError> {
        self.get_json(
            "/me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }
}
