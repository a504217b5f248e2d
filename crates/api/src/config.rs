use deskline_core::account::DEFAULT_MIN_PASSWORD_LENGTH;
use deskline_core::presence::DEFAULT_ONLINE_WINDOW_SECS;

use crate::auth::session::SessionConfig;
use crate::upload::UploadConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the session secret have sensible defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Minimum password length accepted at registration (default: `8`).
    pub min_password_length: usize,
    /// A user seen within this many seconds is reported online (default: `300`).
    pub online_window_secs: i64,
    /// Session signing and cookie settings.
    pub session: SessionConfig,
    /// Attachment storage settings.
    pub upload: UploadConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `MIN_PASSWORD_LENGTH`  | `8`                        |
    /// | `ONLINE_WINDOW_SECS`   | `300`                      |
    ///
    /// See [`SessionConfig::from_env`] and [`UploadConfig::from_env`] for the
    /// nested settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let min_password_length: usize = std::env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| DEFAULT_MIN_PASSWORD_LENGTH.to_string())
            .parse()
            .expect("MIN_PASSWORD_LENGTH must be a valid usize");

        let online_window_secs: i64 = std::env::var("ONLINE_WINDOW_SECS")
            .unwrap_or_else(|_| DEFAULT_ONLINE_WINDOW_SECS.to_string())
            .parse()
            .expect("ONLINE_WINDOW_SECS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            min_password_length,
            online_window_secs,
            session: SessionConfig::from_env(),
            upload: UploadConfig::from_env(),
        }
    }
}
