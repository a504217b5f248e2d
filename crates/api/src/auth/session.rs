//! Signed session tokens.
//!
//! A session token is an HS256-signed JWT whose `sid` claim names a row in
//! `user_sessions`. Only the SHA-256 hash of the `sid` is stored server-side,
//! and revoking that row ends the session even while the signature is still
//! valid.

use deskline_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Session identifier (UUID v4); its hash keys the `user_sessions` row.
    pub sid: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for session signing and lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session lifetime in hours (default: 24).
    pub ttl_hours: i64,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

/// Default session lifetime in hours.
const DEFAULT_TTL_HOURS: i64 = 24;

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var             | Required | Default |
    /// |---------------------|----------|---------|
    /// | `SESSION_SECRET`    | **yes**  | --      |
    /// | `SESSION_TTL_HOURS` | no       | `24`    |
    /// | `COOKIE_SECURE`     | no       | `false` |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_TTL_HOURS.to_string())
            .parse()
            .expect("SESSION_TTL_HOURS must be a valid i64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be `true` or `false`");

        Self {
            secret,
            ttl_hours,
            cookie_secure,
        }
    }

    /// Session lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_hours * 3600
    }
}

/// A freshly issued token together with the hash to persist.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub sid_hash: String,
    pub claims: Claims,
}

/// Issue a session token for `user_id`.
pub fn issue_session_token(
    user_id: DbId,
    config: &SessionConfig,
) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        sid: Uuid::new_v4().to_string(),
        exp: now + config.ttl_secs(),
        iat: now,
    };

    let token = encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(IssuedSession {
        token,
        sid_hash: hash_session_id(&claims.sid),
        claims,
    })
}

/// Validate a session token's signature and expiry, returning its [`Claims`].
pub fn validate_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// SHA-256 hex digest of a session id, as stored in `user_sessions.token_hash`.
pub fn hash_session_id(sid: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sid.as_bytes());
    format!("{:x}", hasher.finalize())
}
