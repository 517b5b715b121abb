//! Bearer-session authentication.
//!
//! Sessions are opaque tokens stored in `user_sessions`; the [`AuthSession`]
//! extractor resolves the `Authorization: Bearer <token>` header against the
//! database on every protected request.

pub mod extractors;
pub mod middleware;

pub use extractors::AuthSession;
