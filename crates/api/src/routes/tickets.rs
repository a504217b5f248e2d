//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET  /               -> list_tickets
/// GET  /new            -> new_ticket_form
/// POST /new            -> create_ticket
/// GET  /{id}           -> view_ticket
/// POST /{id}/comment   -> add_comment (requires auth)
/// POST /{id}/status    -> update_status (requires auth)
/// POST /{id}/assign    -> assign_ticket (requires auth)
/// POST /{id}/attach    -> upload_attachment (requires auth)
/// POST /{id}/upload    -> upload_attachment (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets))
        .route(
            "/new",
            get(tickets::new_ticket_form).post(tickets::create_ticket),
        )
        .route("/{id}", get(tickets::view_ticket))
        .route("/{id}/comment", post(tickets::add_comment))
        .route("/{id}/status", post(tickets::update_status))
        .route("/{id}/assign", post(tickets::assign_ticket))
        .route("/{id}/attach", post(tickets::upload_attachment))
        .route("/{id}/upload", post(tickets::upload_attachment))
}
