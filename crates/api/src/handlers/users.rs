//! Handler for the user directory.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use deskline_core::presence::is_online;
use deskline_db::models::user::UserResponse;
use deskline_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A user together with whether they were seen recently.
#[derive(Debug, Serialize)]
pub struct UserPresence {
    #[serde(flatten)]
    pub user: UserResponse,
    pub online: bool,
}

/// GET /users
///
/// All users by username. The caller's own `last_seen` has just been
/// refreshed by [`AuthUser`], so they always show as online.
pub async fn list_users(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserPresence>>>> {
    let now = Utc::now();
    let window = state.config.online_window_secs;

    let users = UserRepo::list(&state.pool)
        .await?
        .iter()
        .map(|u| UserPresence {
            user: UserResponse::from(u),
            online: is_online(u.last_seen, now, window),
        })
        .collect();

    Ok(Json(DataResponse { data: users }))
}
