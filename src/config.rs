//! Configuration management for Song Swiper.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files. All values are read exactly once at process start into a
//! [`Config`] which is then handed to the server and shared by every handler.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_SCOPE: &str = "playlist-read-private user-library-read";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from `.env` files.
///
/// The working directory is tried first, then the platform-specific local
/// data directory under `songswiper/.env`. Variables that are already set in
/// the process environment are never overridden. Missing files are not an
/// error; required values are validated later by [`Config::from_env`].
///
/// # Directory Structure
///
/// The data directory file is looked up in:
/// - Linux: `~/.local/share/songswiper/.env`
/// - macOS: `~/Library/Application Support/songswiper/.env`
/// - Windows: `%LOCALAPPDATA%/songswiper/.env`
///
/// # Returns
///
/// The paths of all files that were loaded.
pub fn load_env() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenv::dotenv() {
        loaded.push(path);
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songswiper/.env");
    if path.is_file() && dotenv::from_path(&path).is_ok() {
        loaded.push(path);
    }

    loaded
}

/// Runtime configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub scope: Vec<String>,
    pub auth_url: Url,
    pub token_url: Url,
    pub api_url: String,
    pub show_dialog: bool,
    pub server_addr: SocketAddr,
    /// `None` means a random secret is generated per process.
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the client id, client secret or
    /// redirect URI is absent, and [`ConfigError::Invalid`] for values that
    /// cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// use songswiper::config::{self, Config};
    ///
    /// config::load_env();
    /// let config = Config::from_env()?;
    /// println!("listening on {}", config.server_addr);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str, fallback: &str| {
            get(key)
                .or_else(|| get(fallback))
                .ok_or(ConfigError::Missing(key))
        };

        let client_id = required("SPOTIFY_API_AUTH_CLIENT_ID", "CLIENT_ID")?;
        let client_secret = required("SPOTIFY_API_AUTH_CLIENT_SECRET", "CLIENT_SECRET")?;
        let redirect_uri = parse_url(
            "SPOTIFY_API_REDIRECT_URI",
            &required("SPOTIFY_API_REDIRECT_URI", "REDIRECT_URI")?,
        )?;

        let scope = get("SPOTIFY_API_AUTH_SCOPE")
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let auth_url = parse_url(
            "SPOTIFY_API_AUTH_URL",
            &get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
        )?;
        let token_url = parse_url(
            "SPOTIFY_API_TOKEN_URL",
            &get("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        )?;
        let api_url = get("SPOTIFY_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let show_dialog = match get("SPOTIFY_API_SHOW_DIALOG") {
            Some(v) => parse_bool("SPOTIFY_API_SHOW_DIALOG", &v)?,
            None => false,
        };

        let server_addr = get("SERVER_ADDRESS")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "SERVER_ADDRESS",
                reason: e.to_string(),
            })?;

        let session_ttl = parse_secs(
            "SESSION_TTL_SECS",
            get("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        let request_timeout = parse_secs(
            "REQUEST_TIMEOUT_SECS",
            get("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            scope,
            auth_url,
            token_url,
            api_url,
            show_dialog,
            server_addr,
            session_secret: get("SESSION_SECRET"),
            session_ttl,
            request_timeout,
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.redirect_uri.scheme() == "https"
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {:?}", other),
        }),
    }
}

fn parse_secs(
    key: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(v) => v.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
