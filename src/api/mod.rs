//! # API Module
//!
//! HTTP endpoints of the Song Swiper web application.
//!
//! ## Endpoints
//!
//! ### Public
//!
//! - `GET /` - [`index`]: welcome page with a login button
//! - `GET /login` - [`login`]: redirect to the Spotify consent screen
//! - `GET /callback` - [`callback`]: exchange the authorization code for a
//!   token and continue to the dashboard
//! - `GET /logout` - [`logout`]: destroy the session and return to `/`
//! - `GET /health` - [`health`]: status and version for monitoring
//!
//! ### Protected
//!
//! Wrapped by [`require_spotify_auth`], which redirects anonymous users to
//! the authorize URL before any Spotify resource is requested:
//!
//! - `GET /dashboard` - [`dashboard`]: greets the user by display name
//! - `GET /select_playlist` - [`select_playlist`]: playlist choice form
//! - `POST /select_playlist` - [`selected_playlist`]: ordered track list of
//!   the chosen playlist or of the saved tracks
//!
//! ## Middleware
//!
//! - [`session_layer`] - resolves or creates the signed session cookie
//! - [`require_spotify_auth`] - the auth guard
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use songswiper::{config::Config, server};
//!
//! let state = server::AppState::new(Config::from_env()?)?;
//! let app = server::build_router(state);
//! ```

mod callback;
mod dashboard;
mod guard;
mod health;
mod playlist;
mod session;
pub mod views;

pub use callback::{callback, index, login, logout};
pub use dashboard::dashboard;
pub use guard::require_spotify_auth;
pub use health::health;
pub use playlist::{select_playlist, selected_playlist};
pub use session::session_layer;
