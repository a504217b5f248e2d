//! Comment entity model and DTOs.

use deskline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author: String,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for appending a comment to a ticket.
#[derive(Debug)]
pub struct CreateComment {
    pub ticket_id: DbId,
    pub author: String,
    pub body: String,
}
