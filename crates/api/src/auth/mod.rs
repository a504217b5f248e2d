//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`identity`] -- The [`identity::Authenticatable`] capability implemented by users.
//! - [`session`] -- Signed session tokens and their server-side hashes.
//! - [`cookie`] -- The HttpOnly cookie carrying the session token.

pub mod cookie;
pub mod identity;
pub mod password;
pub mod session;
