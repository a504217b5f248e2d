//! Aggregate queries over `tickets` for the dashboard.

use deskline_core::dashboard::{secs_to_days, DashboardStats};
use deskline_core::ticket::{STATUS_CLOSED, STATUS_OPEN};
use sqlx::PgPool;

/// Read-only dashboard statistics.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Total/open/closed counts and the mean resolution time.
    ///
    /// The mean covers only tickets with `finished_at` set; `AVG` over no rows
    /// is `NULL`, which surfaces as `avg_resolution_days: None`.
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        let row: (i64, i64, i64, Option<f64>) = sqlx::query_as(
            "SELECT \
                COUNT(*), \
                COUNT(*) FILTER (WHERE status = $1), \
                COUNT(*) FILTER (WHERE status = $2), \
                (AVG(EXTRACT(EPOCH FROM (finished_at - created_at))) \
                    FILTER (WHERE finished_at IS NOT NULL))::FLOAT8 \
             FROM tickets",
        )
        .bind(STATUS_OPEN)
        .bind(STATUS_CLOSED)
        .fetch_one(pool)
        .await?;

        Ok(DashboardStats {
            total: row.0,
            open: row.1,
            closed: row.2,
            avg_resolution_days: secs_to_days(row.3),
        })
    }
}
