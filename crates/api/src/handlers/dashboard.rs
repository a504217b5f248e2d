//! Handler for the ticket dashboard.

use axum::extract::State;
use axum::Json;
use deskline_core::dashboard::DashboardStats;
use deskline_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /dashboard
///
/// Ticket totals and the mean resolution time in days (`null` until a
/// ticket has been closed).
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let stats = DashboardRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
