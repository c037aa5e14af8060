use std::{collections::BTreeSet, sync::Arc};

use chrono::Utc;
use reqwest::Client;

use crate::{
    config::Config,
    error::{AppError, AuthError, ConfigError, RemoteError},
    management::TokenCache,
    spotify::SpotifyClient,
    types::{Token, TokenResponse},
    warning,
};

/// Owns the OAuth 2.0 authorization-code flow against the Spotify accounts service.
///
/// One manager is built at startup and shared by all handlers. It holds no
/// per-user state; tokens live in the session and are reached through the
/// [`TokenCache`] passed into each call.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    config: Arc<Config>,
    http: Client,
}

impl OAuthManager {
    /// Creates the manager and the shared HTTP client.
    ///
    /// Every request made through the client is bounded by the configured
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: Arc<Config>) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { config, http })
    }

    /// Builds the URL of the Spotify consent screen.
    ///
    /// The URL carries `client_id`, `response_type=code`, the configured
    /// `redirect_uri` and the space-delimited `scope`. When `show_dialog` is
    /// configured the user is asked to approve the app every time.
    ///
    /// # Example
    ///
    /// ```
    /// let url = oauth.get_authorize_url();
    /// // https://accounts.spotify.com/authorize?client_id=...&response_type=code&...
    /// ```
    pub fn get_authorize_url(&self) -> String {
        let mut url = self.config.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("scope", &self.config.scope.join(" "));
            if self.config.show_dialog {
                query.append_pair("show_dialog", "true");
            }
        }
        url.to_string()
    }

    /// Exchanges an authorization code for a token bundle and stores it.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code received on the callback
    /// * `cache` - Token cache of the current session
    ///
    /// # Returns
    ///
    /// - `Ok(Token)` - Fresh token bundle, already saved in the session
    /// - `Err(AppError::Auth)` - The code was invalid, expired or already used
    /// - `Err(AppError::Remote)` - The token endpoint could not be reached
    ///
    /// # Security Note
    ///
    /// Authorization codes are single-use and expire within minutes; the
    /// exchange has to happen directly on the callback.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        cache: &TokenCache,
    ) -> Result<Token, AppError> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        let token = token_from_response(response, None, Utc::now().timestamp())?;
        cache.save(token.clone()).await;
        Ok(token)
    }

    pub async fn get_cached_token(&self, cache: &TokenCache) -> Option<Token> {
        cache.load().await
    }

    /// True iff the current time is strictly before the token's expiry.
    pub fn validate_token(&self, token: &Token) -> bool {
        token.is_valid_at(Utc::now().timestamp())
    }

    /// Exchanges a refresh token for a new token bundle and stores it.
    ///
    /// Spotify may or may not rotate the refresh token. If the response does
    /// not contain one, the previous refresh token is kept.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Rejected`] - The refresh token was revoked or is invalid
    /// - [`RemoteError`] - Network failure or server error
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        cache: &TokenCache,
    ) -> Result<Token, AppError> {
        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let token = token_from_response(response, Some(refresh_token), Utc::now().timestamp())?;
        cache.save(token.clone()).await;
        Ok(token)
    }

    /// Returns an API client for the session, refreshing the token if needed.
    ///
    /// # Returns
    ///
    /// - `Some(client)` - The cached token is valid or was refreshed
    /// - `None` - The session holds no token, or the refresh failed
    ///
    /// `None` is the normal outcome for anonymous users; callers redirect to
    /// the authorize URL instead of treating it as an error.
    ///
    /// # Token Lifecycle
    ///
    /// 1. **No bundle**: nothing to refresh, return `None`
    /// 2. **Valid bundle**: use it as is
    /// 3. **Expired bundle**: refresh with its refresh token. A rejected
    ///    refresh clears the stored bundle so the session becomes anonymous.
    pub async fn get_valid_client(&self, cache: &TokenCache) -> Option<SpotifyClient> {
        let token = self.get_cached_token(cache).await?;

        if self.validate_token(&token) {
            return Some(self.client_for(&token));
        }

        if token.refresh_token.is_empty() {
            cache.clear().await;
            return None;
        }

        match self.refresh_access_token(&token.refresh_token, cache).await {
            Ok(token) => Some(self.client_for(&token)),
            Err(AppError::Auth(e)) => {
                warning!("Token refresh rejected, clearing session token: {}", e);
                cache.clear().await;
                None
            }
            Err(e) => {
                warning!("Token refresh failed: {}", e);
                None
            }
        }
    }

    pub fn client_for(&self, token: &Token) -> SpotifyClient {
        SpotifyClient::new(
            self.http.clone(),
            self.config.api_url.clone(),
            token.access_token.clone(),
        )
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.config.token_url.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(RemoteError::from)?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body }.into());
        }
        if !status.is_success() {
            let url = response.url().clone();
            return Err(RemoteError::Status { status, url }.into());
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()).into())
    }
}

/// Converts a token endpoint response into a bundle expiring `expires_in`
/// seconds after `now`.
pub fn token_from_response(
    response: TokenResponse,
    previous_refresh_token: Option<&str>,
    now: i64,
) -> Result<Token, AuthError> {
    if response.access_token.is_empty() {
        return Err(AuthError::InvalidResponse(
            "empty access_token".to_string(),
        ));
    }
    if response.expires_in <= 0 {
        return Err(AuthError::InvalidResponse(format!(
            "non-positive expires_in {}",
            response.expires_in
        )));
    }

    let refresh_token = response
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| previous_refresh_token.map(str::to_string))
        .unwrap_or_default();

    let scope: BTreeSet<String> = response
        .scope
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    Ok(Token {
        access_token: response.access_token,
        refresh_token,
        expires_at: now.saturating_add(response.expires_in),
        scope,
    })
}
