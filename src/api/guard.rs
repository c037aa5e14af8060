use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    management::{Session, TokenCache},
    server::AppState,
};

/// Lets a request through only with a valid or refreshable Spotify token.
///
/// The authenticated [`crate::spotify::SpotifyClient`] is placed in the
/// request extensions for the wrapped handler. Without a usable token the
/// user is sent to the Spotify authorize URL; no remote resource call is made.
pub async fn require_spotify_auth(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut request: Request,
    next: Next,
) -> Response {
    let cache = TokenCache::new(session);

    match state.oauth.get_valid_client(&cache).await {
        Some(client) => {
            request.extensions_mut().insert(client);
            next.run(request).await
        }
        None => Redirect::to(&state.oauth.get_authorize_url()).into_response(),
    }
}
