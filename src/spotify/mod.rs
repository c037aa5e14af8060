//! # Spotify Integration Module
//!
//! This module is the integration layer between Song Swiper and the Spotify
//! accounts service and Web API. It hides HTTP details, token handling and
//! retry rules behind a small Rust interface used by the route handlers.
//!
//! ## Architecture
//!
//! ```text
//! Route Handlers
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 authorization code)
//!     ├── User Profile
//!     ├── Playlists (listing, metadata, items)
//!     └── Library (saved tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - [`auth::OAuthManager`]: authorize URL, code exchange, token
//!   validation and refresh.
//! - [`user`] - Current user profile.
//! - [`playlist`] - Playlist listing, metadata and items.
//! - [`library`] - The user's saved tracks ("Liked Songs").
//!
//! ## Error Handling
//!
//! Every resource request goes through [`send_with_retry`]:
//! - **Timeouts**: retried once
//! - **502 Bad Gateway**: retried once after a short pause
//! - **429 Too Many Requests**: retried once if `Retry-After` is at most
//!   [`MAX_RETRY_AFTER_SECS`] seconds
//! - **401 Unauthorized**: reported as [`RemoteError::Unauthorized`]
//! - Any other non-success status is a [`RemoteError::Status`]
//!
//! ## API Coverage
//!
//! - `GET /me`
//! - `GET /me/playlists`
//! - `GET /me/tracks`
//! - `GET /playlists/{playlist_id}`
//! - `GET /playlists/{playlist_id}/tracks`
//! - `POST /api/token` (accounts service)

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{error::RemoteError, warning};

pub mod auth;
pub mod library;
pub mod playlist;
pub mod user;

/// Longest `Retry-After` delay that is waited out before the single retry.
pub const MAX_RETRY_AFTER_SECS: u64 = 10;

const BAD_GATEWAY_PAUSE: Duration = Duration::from_secs(1);

/// Authenticated Spotify Web API client for a single access token.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: String, access_token: String) -> Self {
        Self {
            http,
            api_url,
            access_token,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = format!("{}{}", self.api_url, path);
        let request = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query);

        let response = send_with_retry(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Sends a request with a single retry budget for transient failures.
pub async fn send_with_retry(request: RequestBuilder) -> Result<Response, RemoteError> {
    let retry = request.try_clone();
    let result = request.send().await;

    let delay = match &result {
        Err(err) if err.is_timeout() => Some(Duration::ZERO),
        Ok(resp) if resp.status() == StatusCode::BAD_GATEWAY => Some(BAD_GATEWAY_PAUSE),
        Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => retry_after(resp),
        _ => None,
    };

    let response = match (delay, retry) {
        (Some(delay), Some(retry)) => {
            warning!("Spotify request failed transiently, retrying once.");
            sleep(delay).await;
            retry.send().await?
        }
        _ => result?,
    };

    check_status(response)
}

fn retry_after(response: &Response) -> Option<Duration> {
    let secs = response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;

    if secs <= MAX_RETRY_AFTER_SECS {
        Some(Duration::from_secs(secs))
    } else {
        warning!(
            "Retry after has reached an abnormal high of {} seconds, not retrying.",
            secs
        );
        None
    }
}

fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(RemoteError::Unauthorized);
    }
    if !status.is_success() {
        return Err(RemoteError::Status {
            status,
            url: response.url().clone(),
        });
    }
    Ok(response)
}
