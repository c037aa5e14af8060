use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{
    api::views,
    error::{AppError, AuthError},
    info,
    management::{Session, TokenCache, short_id},
    server::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(views::index_page())
}

pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.oauth.get_authorize_url())
}

/// Completes the authorization-code flow and stores the token in the session.
pub async fn callback(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    if let Some(reason) = params.error {
        return Err(AuthError::Denied(reason).into());
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let cache = TokenCache::new(session);
    state.oauth.exchange_code_for_token(&code, &cache).await?;
    if let Some(id) = cache.session().id().await {
        info!("Session {} authenticated.", short_id(&id));
    }

    Ok(Redirect::to("/dashboard"))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    session.clear().await;
    (
        [(header::SET_COOKIE, state.cookies.expired_cookie())],
        Redirect::to("/"),
    )
}
