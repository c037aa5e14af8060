mod auth;
mod cookie;
mod session;

pub use auth::TokenCache;
pub use cookie::CookieSigner;
pub use cookie::SESSION_COOKIE;
pub use session::Session;
pub use session::SessionStore;
pub use session::short_id;
