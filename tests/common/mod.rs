#![allow(dead_code)]

use std::{collections::BTreeSet, time::Duration};

use chrono::Utc;
use reqwest::Url;
use songswiper::{
    config::Config,
    management::{SESSION_COOKIE, Session, TokenCache},
    server::AppState,
    types::Token,
};

pub const BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

// Helper function to create a configuration pointing at a mock server
pub fn test_config(base: &str) -> Config {
    Config {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: Url::parse("http://127.0.0.1:5000/callback").unwrap(),
        scope: vec![
            "playlist-read-private".to_string(),
            "user-library-read".to_string(),
        ],
        auth_url: Url::parse(&format!("{}/authorize", base)).unwrap(),
        token_url: Url::parse(&format!("{}/api/token", base)).unwrap(),
        api_url: format!("{}/v1", base),
        show_dialog: false,
        server_addr: "127.0.0.1:0".parse().unwrap(),
        session_secret: Some("test-secret".to_string()),
        session_ttl: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(5),
    }
}

pub fn test_state(base: &str) -> AppState {
    AppState::new(test_config(base)).unwrap()
}

// Helper function to create a token expiring `expires_in` seconds from now
pub fn test_token(access: &str, refresh: &str, expires_in: i64) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at: Utc::now().timestamp() + expires_in,
        scope: BTreeSet::from(["playlist-read-private".to_string()]),
    }
}

/// Creates a session holding `token` and returns its id and `Cookie` header value.
pub async fn seed_session(state: &AppState, token: Option<Token>) -> (String, String) {
    let id = state.sessions.create().await;
    if token.is_some() {
        state.sessions.set_token(&id, token).await;
    }
    let cookie = format!("{}={}", SESSION_COOKIE, state.cookies.sign(&id));
    (id, cookie)
}

pub async fn token_cache(state: &AppState) -> TokenCache {
    let id = state.sessions.create().await;
    TokenCache::new(Session::new(id, state.sessions.clone()))
}
