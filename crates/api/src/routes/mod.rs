pub mod auth;
pub mod dashboard;
pub mod health;
pub mod tickets;
pub mod uploads;
pub mod users;

use std::path::Path;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree. Everything is mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /health                          service + database health
///
/// /login                           form descriptor (GET), login (POST)
/// /register                        form descriptor (GET), register (POST)
/// /logout                          end session (GET)
///
/// /tickets                         list, ?q= title filter
/// /tickets/new                     form descriptor (GET), file ticket (POST)
/// /tickets/{id}                    detail with comments and attachments
/// /tickets/{id}/comment            add comment (requires auth)
/// /tickets/{id}/status             change status (requires auth)
/// /tickets/{id}/assign             set/clear assignee (requires auth)
/// /tickets/{id}/attach             upload attachment (requires auth)
/// /tickets/{id}/upload             alias of /attach
///
/// /uploads/{filename}              stored attachment bytes
///
/// /dashboard                       ticket statistics
/// /users                           users with online status (requires auth)
/// ```
pub fn app_routes(upload_dir: &Path) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .nest("/tickets", tickets::router())
        .nest_service("/uploads", uploads::service(upload_dir))
        .merge(dashboard::router())
        .merge(users::router())
}
