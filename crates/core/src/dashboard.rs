//! Dashboard aggregate helpers.

use serde::Serialize;

/// Seconds in one day, used to express resolution time in days.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Aggregate ticket statistics shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub open: i64,
    pub closed: i64,
    /// Mean days between `created_at` and `finished_at` over finished
    /// tickets. `None` when no ticket has finished.
    pub avg_resolution_days: Option<f64>,
}

/// Convert a mean duration in seconds to days.
pub fn secs_to_days(avg_secs: Option<f64>) -> Option<f64> {
    avg_secs.map(|s| s / SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_finished_tickets_has_no_average() {
        assert_eq!(secs_to_days(None), None);
    }

    #[test]
    fn two_days() {
        assert_eq!(secs_to_days(Some(2.0 * SECONDS_PER_DAY)), Some(2.0));
    }

    #[test]
    fn half_day() {
        assert_eq!(secs_to_days(Some(43_200.0)), Some(0.5));
    }
}
