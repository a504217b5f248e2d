//! The HttpOnly cookie carrying the session token.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::session::SessionConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "deskline_session";

/// Cookie holding a freshly issued session token.
pub fn session_cookie(token: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.ttl_secs()))
        .path("/")
        .build()
}

/// Expired cookie that makes the browser drop the session cookie.
pub fn logout_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .path("/")
        .build()
}
