//! Ticket entity model and DTOs.

use deskline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::attachment::Attachment;
use crate::models::comment::Comment;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub ticket_number: i64,
    pub submitted_by: String,
    pub creator_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

/// DTO for inserting a ticket whose number and submitter are already resolved.
#[derive(Debug)]
pub struct CreateTicket {
    pub ticket_number: i64,
    pub submitted_by: String,
    pub creator_id: Option<DbId>,
    pub title: String,
    pub description: String,
}

/// DTO for filing a ticket through `TicketRepo::create_next`, which assigns
/// the number and resolves the submitter.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Username of the logged-in filer, if any. Takes precedence over `submitted_by`.
    pub authenticated_username: Option<String>,
    /// Free-text name supplied on the form.
    pub submitted_by: Option<String>,
    pub creator_id: Option<DbId>,
    pub title: String,
    pub description: String,
}

/// A ticket together with its discussion and files.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}
