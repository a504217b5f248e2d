//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must join a
//! caller's transaction take `&mut PgConnection` instead.

pub mod attachment_repo;
pub mod comment_repo;
pub mod dashboard_repo;
pub mod session_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use attachment_repo::AttachmentRepo;
pub use comment_repo::CommentRepo;
pub use dashboard_repo::DashboardRepo;
pub use session_repo::SessionRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique violation on the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
