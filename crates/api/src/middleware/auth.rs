//! Session-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use deskline_core::error::CoreError;
use deskline_core::types::DbId;
use deskline_db::repositories::{SessionRepo, UserRepo};

use crate::auth::cookie::SESSION_COOKIE_NAME;
use crate::auth::session::{hash_session_id, validate_session_token};
use crate::error::{unauthorized, AppError, AppResult};
use crate::state::AppState;

/// The authenticated user behind the current request.
///
/// The session token is read from `Authorization: Bearer <token>` or, failing
/// that, from the session cookie. The token's signature and expiry are
/// checked, then its session row must still be active. Every successful
/// extraction refreshes the user's `last_seen`.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
}

/// Read the raw session token from the request headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    if bearer.is_some() {
        return bearer;
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve a token to its live session's user.
async fn authenticate(token: &str, state: &AppState) -> AppResult<AuthUser> {
    let claims = validate_session_token(token, &state.config.session)
        .map_err(|_| unauthorized("Invalid or expired session"))?;

    let session = SessionRepo::find_active_by_token_hash(&state.pool, &hash_session_id(&claims.sid))
        .await?
        .filter(|s| s.user_id == claims.sub)
        .ok_or_else(|| unauthorized("Session has ended, please log in again"))?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;

    UserRepo::touch_last_seen(&state.pool, user.id).await?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| unauthorized("Login required"))?;
        authenticate(&token, state).await
    }
}

/// The authenticated user if the request carries a live session.
///
/// A missing, expired or revoked session yields `MaybeAuthUser(None)` rather
/// than a rejection; database failures still propagate.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeAuthUser(None));
        };
        match authenticate(&token, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Core(CoreError::Unauthorized(_))) => Ok(MaybeAuthUser(None)),
            Err(e) => Err(e),
        }
    }
}
