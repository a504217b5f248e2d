//! Repository for the `comments` table.

use deskline_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list for `comments` queries.
const COLUMNS: &str = "id, ticket_id, author, body, created_at";

/// Provides CRUD operations for ticket comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Append a comment to a ticket, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (ticket_id, author, body) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.ticket_id)
            .bind(&input.author)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// List all comments for a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE ticket_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Count comments on a ticket.
    pub async fn count_for_ticket(pool: &PgPool, ticket_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
