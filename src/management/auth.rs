use crate::{management::Session, types::Token};

/// Stores the OAuth token bundle in the current session.
///
/// Purely storage: no validation happens here.
#[derive(Debug, Clone)]
pub struct TokenCache {
    session: Session,
}

impl TokenCache {
    pub fn new(session: Session) -> Self {
        TokenCache { session }
    }

    pub async fn load(&self) -> Option<Token> {
        self.session.token().await
    }

    pub async fn save(&self, token: Token) {
        self.session.set_token(Some(token)).await
    }

    pub async fn clear(&self) {
        self.session.set_token(None).await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
