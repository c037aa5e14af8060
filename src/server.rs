use std::sync::Arc;

use axum::{Router, middleware, routing::get};

use crate::{
    Res, api,
    config::Config,
    error::ConfigError,
    info,
    management::{CookieSigner, SessionStore},
    spotify::auth::OAuthManager,
    success, warning,
};

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub oauth: OAuthManager,
    pub sessions: SessionStore,
    pub cookies: CookieSigner,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let secret = match &config.session_secret {
            Some(secret) => secret.clone(),
            None => {
                warning!("SESSION_SECRET not set, sessions will not survive a restart.");
                CookieSigner::random_secret()
            }
        };

        let cookies = CookieSigner::new(&secret, config.secure_cookies())?;
        let sessions = SessionStore::new(config.session_ttl);
        let config = Arc::new(config);
        let oauth = OAuthManager::new(Arc::clone(&config))?;

        Ok(Self {
            config,
            oauth,
            sessions,
            cookies,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(api::dashboard))
        .route(
            "/select_playlist",
            get(api::select_playlist).post(api::selected_playlist),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_spotify_auth,
        ));

    Router::new()
        .route("/", get(api::index))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/health", get(api::health))
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), api::session_layer))
        .with_state(state)
}

/// Binds the configured address and serves until the process is terminated.
pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = state.config.server_addr;
    let app = build_router(state);

    info!("Binding to {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    success!("Song Swiper is listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
