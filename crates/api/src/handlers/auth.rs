//! Handlers for registration, login and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use deskline_core::account::{normalize_username, validate_password_strength, validate_username};
use deskline_core::error::CoreError;
use deskline_core::types::DbId;
use deskline_db::models::session::CreateSession;
use deskline_db::models::user::{CreateUser, UserResponse};
use deskline_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::cookie::{logout_cookie, session_cookie};
use crate::auth::identity::Authenticatable;
use crate::auth::password::hash_password;
use crate::auth::session::{hash_session_id, issue_session_token, validate_session_token};
use crate::error::{unauthorized, AppError, AppResult};
use crate::extract::FormInput;
use crate::forms::{self, FormDescriptor};
use crate::middleware::auth::session_token;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Form body for `POST /register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    pub password: String,
}

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
///
/// The same token is also set as the session cookie; API clients may send it
/// as `Authorization: Bearer <token>` instead.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Session lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Form descriptors
// ---------------------------------------------------------------------------

/// GET /login
pub async fn login_form() -> Json<DataResponse<FormDescriptor>> {
    Json(DataResponse {
        data: forms::login_form(),
    })
}

/// GET /register
pub async fn register_form() -> Json<DataResponse<FormDescriptor>> {
    Json(DataResponse {
        data: forms::register_form(),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /register
///
/// Create an account and log it in. A taken username or email is a 409.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    FormInput(mut input): FormInput<RegisterForm>,
) -> AppResult<impl IntoResponse> {
    input.email = input
        .email
        .take()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    input.validate().map_err(CoreError::from)?;
    validate_username(&input.username)?;
    validate_password_strength(&input.password, state.config.min_password_length)?;

    let username = normalize_username(&input.username).to_string();

    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Username '{username}' is already taken"
        ))));
    }
    if let Some(email) = &input.email {
        if UserRepo::find_by_email(&state.pool, email).await?.is_some() {
            return Err(AppError::Core(CoreError::Conflict(
                "Email address is already registered".into(),
            )));
        }
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent registration that slips past the checks above fails on
    // `uq_users_username` and surfaces as a 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    let (jar, token) = start_session(&state, jar, user.id).await?;
    UserRepo::touch_last_seen(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(DataResponse {
            data: AuthResponse {
                token,
                expires_in: state.config.session.ttl_secs(),
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// POST /login
///
/// Authenticate with username + password and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormInput(input): FormInput<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_username(&state.pool, normalize_username(&input.username))
        .await?
        .ok_or_else(|| unauthorized("Invalid username or password"))?;

    let password_valid = user
        .check_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Rejected login with wrong password");
        return Err(unauthorized("Invalid username or password"));
    }

    let (jar, token) = start_session(&state, jar, user.id).await?;
    UserRepo::touch_last_seen(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, username = user.username(), "User logged in");

    Ok((
        jar,
        Json(DataResponse {
            data: AuthResponse {
                token,
                expires_in: state.config.session.ttl_secs(),
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// GET /logout
///
/// End the current session if there is one and clear the cookie. Always 204.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        if let Ok(claims) = validate_session_token(&token, &state.config.session) {
            let revoked =
                SessionRepo::revoke_by_token_hash(&state.pool, &hash_session_id(&claims.sid))
                    .await?;
            tracing::info!(user_id = claims.sub, revoked, "User logged out");
        }
    }

    Ok((
        StatusCode::NO_CONTENT,
        jar.add(logout_cookie(&state.config.session)),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a session token, persist its session row, and set the cookie.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user_id: DbId,
) -> AppResult<(CookieJar, String)> {
    let issued = issue_session_token(user_id, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_at = Utc::now() + chrono::Duration::seconds(state.config.session.ttl_secs());

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            token_hash: issued.sid_hash,
            expires_at,
        },
    )
    .await?;

    let jar = jar.add(session_cookie(issued.token.clone(), &state.config.session));
    Ok((jar, issued.token))
}
