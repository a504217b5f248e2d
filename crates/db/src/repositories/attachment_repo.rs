//! Repository for the `attachments` table.

use deskline_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::attachment::Attachment;

/// Column list for `attachments` queries.
const COLUMNS: &str = "id, ticket_id, filename, uploaded_at";

/// Provides CRUD operations for ticket attachments.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Record an attachment. Takes a connection so it can share the
    /// transaction that created the ticket.
    pub async fn create(
        conn: &mut PgConnection,
        ticket_id: DbId,
        filename: &str,
    ) -> Result<Attachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments (ticket_id, filename) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(ticket_id)
            .bind(filename)
            .fetch_one(&mut *conn)
            .await
    }

    /// List attachments for a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attachments WHERE ticket_id = $1 ORDER BY uploaded_at ASC, id ASC"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Count attachments on a ticket.
    pub async fn count_for_ticket(pool: &PgPool, ticket_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attachments WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
