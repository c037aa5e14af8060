use crate::{error::RemoteError, spotify::SpotifyClient, types::UserProfile};

impl SpotifyClient {
    /// Fetches the profile of the user the access token belongs to.
    pub async fn current_user(&self) -> Result<UserProfile, RemoteError> {
        self.get_json("/me", &[]).await
    }
}
