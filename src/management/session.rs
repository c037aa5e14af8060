use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{types::Token, utils, warning};

#[derive(Debug, Clone)]
struct SessionEntry {
    token: Option<Token>,
    last_seen: i64,
}

/// Server-side session storage keyed by session id.
///
/// Entries expire after `ttl` without activity and are purged lazily when a
/// new session is created or an expired one is looked up.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates an empty session and returns its id.
    pub async fn create(&self) -> String {
        let now = Utc::now().timestamp();
        let mut sessions = self.inner.lock().await;
        let ttl = self.ttl_secs();
        sessions.retain(|_, entry| now - entry.last_seen < ttl);

        let mut id = utils::generate_session_id();
        while sessions.contains_key(&id) {
            id = utils::generate_session_id();
        }
        sessions.insert(
            id.clone(),
            SessionEntry {
                token: None,
                last_seen: now,
            },
        );
        id
    }

    /// Marks the session as active. Returns `false` if it is unknown or expired.
    pub async fn touch(&self, id: &str) -> bool {
        let now = Utc::now().timestamp();
        let mut sessions = self.inner.lock().await;
        match sessions.get_mut(id) {
            Some(entry) if now - entry.last_seen < self.ttl_secs() => {
                entry.last_seen = now;
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    pub async fn token(&self, id: &str) -> Option<Token> {
        let sessions = self.inner.lock().await;
        sessions.get(id).and_then(|entry| entry.token.clone())
    }

    /// Replaces the token of a live session.
    ///
    /// Writes to a removed session are dropped so a logout cannot be undone
    /// by a request that was still in flight. Returns `false` in that case.
    pub async fn set_token(&self, id: &str, token: Option<Token>) -> bool {
        let now = Utc::now().timestamp();
        let mut sessions = self.inner.lock().await;
        match sessions.get_mut(id) {
            Some(entry) => {
                entry.token = token;
                entry.last_seen = now;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) {
        self.inner.lock().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Handle to the session of the current request.
///
/// A handle built with [`Session::anonymous`] has no id and no store entry
/// until the first token is written. Requests that never log in leave the
/// store untouched.
#[derive(Debug, Clone)]
pub struct Session {
    id: Arc<Mutex<Option<String>>>,
    store: SessionStore,
}

impl Session {
    /// Handle to an existing session.
    pub fn new(id: String, store: SessionStore) -> Self {
        Self {
            id: Arc::new(Mutex::new(Some(id))),
            store,
        }
    }

    pub fn anonymous(store: SessionStore) -> Self {
        Self {
            id: Arc::new(Mutex::new(None)),
            store,
        }
    }

    /// Id of the backing store entry, `None` while the session is anonymous.
    pub async fn id(&self) -> Option<String> {
        self.id.lock().await.clone()
    }

    pub async fn token(&self) -> Option<Token> {
        let id = self.id().await?;
        self.store.token(&id).await
    }

    /// Stores `token`, creating the session entry on the first write.
    pub async fn set_token(&self, token: Option<Token>) {
        let mut id = self.id.lock().await;
        if let Some(existing) = id.as_deref() {
            if !self.store.set_token(existing, token).await {
                warning!("Dropped token write to closed session {}", short_id(existing));
            }
            return;
        }
        if let Some(token) = token {
            let created = self.store.create().await;
            self.store.set_token(&created, Some(token)).await;
            *id = Some(created);
        }
    }

    /// Destroys the session and everything stored in it.
    pub async fn clear(&self) {
        if let Some(id) = self.id().await {
            self.store.remove(&id).await
        }
    }
}

/// First characters of a session id, safe to log.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
