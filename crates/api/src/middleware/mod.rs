//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- Requires a live session; rejects with 401 otherwise.
//! - [`auth::MaybeAuthUser`] -- The session's user when present, for routes
//!   that also serve anonymous visitors.

pub mod auth;
