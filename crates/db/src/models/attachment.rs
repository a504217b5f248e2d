//! Attachment entity model and DTOs.

use deskline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attachments` table.
///
/// `filename` is the sanitized name of the file inside the upload directory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attachment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub filename: String,
    pub uploaded_at: Timestamp,
}
