use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha2::Sha256;

use crate::error::ConfigError;

pub const SESSION_COOKIE: &str = "songswiper_session";

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies session cookie values (`<id>.<signature>`).
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
    secure: bool,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl CookieSigner {
    pub fn new(secret: &str, secure: bool) -> Result<Self, ConfigError> {
        let mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| ConfigError::Invalid {
                key: "SESSION_SECRET",
                reason: e.to_string(),
            })?;
        Ok(Self { mac, secure })
    }

    pub fn random_secret() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    pub fn sign(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", id, signature)
    }

    /// Returns the session id if the signature matches.
    pub fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (id, signature) = value.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id)
    }

    /// Reads and verifies the session id from the request's `Cookie` headers.
    pub fn session_id<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE)
            .find_map(|(_, value)| self.verify(value))
    }

    pub fn set_cookie(&self, id: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/{}",
            SESSION_COOKIE,
            self.sign(id),
            if self.secure { "; Secure" } else { "" }
        )
    }

    pub fn expired_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
            SESSION_COOKIE,
            if self.secure { "; Secure" } else { "" }
        )
    }
}
