//! Error types shared across the application.
//!
//! Three kinds of failure exist:
//!
//! - [`ConfigError`] - missing or malformed configuration at startup. Fatal.
//! - [`AuthError`] - a missing, denied, rejected or revoked credential. Always
//!   recoverable by running the authorization flow again.
//! - [`RemoteError`] - network failures or non-success responses from the
//!   Spotify Web API.
//!
//! Route handlers return [`AppError`], which renders the matching response and
//! logs the failure.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use reqwest::Url;
use thiserror::Error;

use crate::{api::views, warning};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization code missing from callback")]
    MissingCode,

    #[error("authorization denied: {0}")]
    Denied(String),

    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("token endpoint returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with {status}")]
    Status { status: StatusCode, url: Url },

    #[error("access token was not accepted")]
    Unauthorized,

    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warning!("Request failed: {}", self);

        match self {
            AppError::Auth(_) => (
                StatusCode::BAD_REQUEST,
                Html(views::error_page(
                    "Login failed.",
                    "Spotify did not accept the login. Please try again.",
                    true,
                )),
            )
                .into_response(),
            // The stored token looked valid but Spotify disagrees; start over.
            AppError::Remote(RemoteError::Unauthorized) => Redirect::to("/login").into_response(),
            AppError::Remote(_) => (
                StatusCode::BAD_GATEWAY,
                Html(views::error_page(
                    "Something went wrong.",
                    "Spotify could not be reached. Please try again later.",
                    false,
                )),
            )
                .into_response(),
            AppError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                Html(views::error_page("Bad request.", &reason, false)),
            )
                .into_response(),
        }
    }
}
