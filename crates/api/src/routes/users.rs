use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// `GET /users -> list_users` (requires auth)
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(users::list_users))
}
