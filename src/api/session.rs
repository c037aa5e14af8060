use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::{management::Session, server::AppState, warning};

/// Attaches a [`Session`] to every request.
///
/// A valid signed cookie resumes its session. Without one the request gets an
/// anonymous session; the cookie is only issued if the handler stored a token
/// and thereby created a session entry.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = state
        .cookies
        .session_id(request.headers())
        .map(str::to_string);

    let resumed = match existing {
        Some(id) => {
            let alive = state.sessions.touch(&id).await;
            alive.then_some(id)
        }
        None => None,
    };

    let anonymous = resumed.is_none();
    let session = match resumed {
        Some(id) => Session::new(id, state.sessions.clone()),
        None => Session::anonymous(state.sessions.clone()),
    };

    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if !anonymous {
        return response;
    }
    if let Some(id) = session.id().await {
        match HeaderValue::from_str(&state.cookies.set_cookie(&id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warning!("Failed to encode session cookie: {}", e),
        }
    }

    response
}
