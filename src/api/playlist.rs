use axum::{Extension, Form, response::Html};
use serde::Deserialize;

use crate::{
    api::views::{self, LIKED_SONGS},
    error::AppError,
    spotify::SpotifyClient,
    utils::{self, MAX_PAGES, Paginator},
};

#[derive(Debug, Deserialize)]
pub struct SelectPlaylistForm {
    pub playlist_id: Option<String>,
}

/// Renders the playlist choice, with "Liked Songs" offered first.
pub async fn select_playlist(
    Extension(client): Extension<SpotifyClient>,
) -> Result<Html<String>, AppError> {
    let client = &client;
    let playlists = Paginator::default()
        .with_max_pages(MAX_PAGES)
        .collect_all(move |limit, offset| client.current_user_playlists(limit, offset))
        .await?;

    Ok(Html(views::playlist_form(&playlists)))
}

/// Lists every track of the selected playlist or of the saved tracks.
pub async fn selected_playlist(
    Extension(client): Extension<SpotifyClient>,
    Form(form): Form<SelectPlaylistForm>,
) -> Result<Html<String>, AppError> {
    let playlist_id = form
        .playlist_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("no playlist selected".to_string()))?;

    let client = &client;
    let paginator = Paginator::default().with_max_pages(MAX_PAGES);

    let (playlist_name, items) = if playlist_id == LIKED_SONGS {
        let items = paginator
            .collect_all(move |limit, offset| client.current_user_saved_tracks(limit, offset))
            .await?;
        ("Liked Songs".to_string(), items)
    } else {
        if !is_playlist_id(&playlist_id) {
            return Err(AppError::BadRequest(format!(
                "{:?} is not a playlist id",
                playlist_id
            )));
        }
        let id = playlist_id.as_str();
        let playlist = client.playlist(id).await?;
        let items = paginator
            .collect_all(move |limit, offset| client.playlist_items(id, limit, offset))
            .await?;
        (playlist.name, items)
    };

    let tracks = utils::track_rows(items);
    Ok(Html(views::track_list_page(&playlist_name, &tracks)))
}

/// Spotify ids are base62.
fn is_playlist_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}
