//! Repository for the `tickets` table.

use deskline_core::ticket::{next_ticket_number, resolve_submitter, STATUS_OPEN};
use deskline_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::ticket::{CreateTicket, NewTicket, Ticket, TicketDetail};
use crate::repositories::{AttachmentRepo, CommentRepo};

/// Column list for `tickets` queries.
const COLUMNS: &str = "\
    id, ticket_number, submitted_by, creator_id, assignee_id, \
    title, description, status, created_at, updated_at, finished_at";

/// Unique constraint guarding `ticket_number`.
pub const TICKET_NUMBER_CONSTRAINT: &str = "uq_tickets_ticket_number";

/// Advisory lock key serializing ticket numbering across transactions.
const NUMBERING_LOCK_KEY: i64 = 0x7469_636b_6574; // "ticket"

/// Provides CRUD operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Highest ticket number in use, or `None` when there are no tickets.
    pub async fn max_ticket_number(conn: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(ticket_number) FROM tickets")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    /// Insert a ticket with an already-assigned number, returning the full row.
    ///
    /// A number already in use fails with a unique violation on
    /// [`TICKET_NUMBER_CONSTRAINT`].
    pub async fn create(conn: &mut PgConnection, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets \
                (ticket_number, submitted_by, creator_id, title, description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(input.ticket_number)
            .bind(&input.submitted_by)
            .bind(input.creator_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(STATUS_OPEN)
            .fetch_one(&mut *conn)
            .await
    }

    /// Number and insert a new ticket.
    ///
    /// Must run inside a transaction: the numbering lock is held until that
    /// transaction ends, so concurrent callers observe each other's inserts.
    pub async fn create_next(conn: &mut PgConnection, input: &NewTicket) -> Result<Ticket, sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(NUMBERING_LOCK_KEY)
            .execute(&mut *conn)
            .await?;

        let ticket_number = next_ticket_number(Self::max_ticket_number(conn).await?);
        let submitted_by = resolve_submitter(
            input.authenticated_username.as_deref(),
            input.submitted_by.as_deref(),
            ticket_number,
        );
        tracing::debug!(ticket_number, %submitted_by, "Allocated ticket number");

        let create = CreateTicket {
            ticket_number,
            submitted_by,
            creator_id: input.creator_id,
            title: input.title.clone(),
            description: input.description.clone(),
        };
        Self::create(conn, &create).await
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a ticket with its comments (oldest first) and attachments.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TicketDetail>, sqlx::Error> {
        let Some(ticket) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let comments = CommentRepo::list_for_ticket(pool, id).await?;
        let attachments = AttachmentRepo::list_for_ticket(pool, id).await?;
        Ok(Some(TicketDetail {
            ticket,
            comments,
            attachments,
        }))
    }

    /// List tickets newest number first, optionally filtered by an `ILIKE`
    /// pattern on the title (see `deskline_core::ticket::title_filter_pattern`).
    pub async fn list(
        pool: &PgPool,
        title_pattern: Option<&str>,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        match title_pattern {
            Some(pattern) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM tickets \
                     WHERE title ILIKE $1 ESCAPE '\\' \
                     ORDER BY ticket_number DESC"
                );
                sqlx::query_as::<_, Ticket>(&query)
                    .bind(pattern)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM tickets ORDER BY ticket_number DESC");
                sqlx::query_as::<_, Ticket>(&query).fetch_all(pool).await
            }
        }
    }

    /// Set the status and `finished_at` of a ticket. Returns the updated row if found.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        finished_at: Option<Timestamp>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = $2, finished_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(status)
            .bind(finished_at)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the assignee. Returns the updated row if found.
    pub async fn set_assignee(
        pool: &PgPool,
        id: DbId,
        assignee_id: Option<DbId>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query =
            format!("UPDATE tickets SET assignee_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(assignee_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket along with its comments and attachments (cascade).
    ///
    /// Returns `true` if the row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
