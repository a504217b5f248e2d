//! Route definitions for accounts and sessions.

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Account routes, mounted at the root.
///
/// ```text
/// GET  /login     -> login_form
/// POST /login     -> login
/// GET  /register  -> register_form
/// POST /register  -> register
/// GET  /logout    -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout))
}
