//! Handlers for filing, browsing and working on tickets.
//!
//! Listing, viewing and filing are public; anonymous visitors may file
//! tickets. Commenting, status changes, assignment and attaching files
//! require a session.

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use deskline_core::error::CoreError;
use deskline_core::ticket::{
    finished_at_for, normalize_status, title_filter_pattern, validate_body, validate_title,
};
use deskline_core::types::DbId;
use deskline_db::models::comment::CreateComment;
use deskline_db::models::ticket::{NewTicket, Ticket, TicketDetail};
use deskline_db::repositories::ticket_repo::TICKET_NUMBER_CONSTRAINT;
use deskline_db::repositories::{
    is_unique_violation, AttachmentRepo, CommentRepo, TicketRepo, UserRepo,
};
use serde::Deserialize;
use sqlx::{Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::extract::{FormInput, MultipartForm};
use crate::forms::{self, FormDescriptor};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{PendingUpload, UploadStore};

/// How many times a ticket is re-filed after losing a numbering race.
const MAX_NUMBERING_ATTEMPTS: u32 = 5;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /tickets`.
#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    /// Case-insensitive title substring.
    pub q: Option<String>,
}

/// Urlencoded body for `POST /tickets/new` (no attachment).
#[derive(Debug, Deserialize)]
pub struct NewTicketForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Body for `POST /tickets/{id}/assign`. A missing or blank `assignee`
/// clears the assignment.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    #[serde(default)]
    pub assignee: Option<String>,
}

/// A new-ticket submission, sent either multipart (optionally with a file)
/// or urlencoded.
#[derive(Debug)]
pub struct TicketSubmission {
    pub form: NewTicketForm,
    pub attachment: Option<(String, axum::body::Bytes)>,
}

impl FromRequest<AppState> for TicketSubmission {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let FormInput(form) = FormInput::<NewTicketForm>::from_request(req, state).await?;
            return Ok(TicketSubmission {
                form,
                attachment: None,
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let parsed = MultipartForm::read(multipart).await?;

        Ok(TicketSubmission {
            form: NewTicketForm {
                title: parsed.required("title")?,
                description: parsed.required("description")?,
                submitted_by: parsed.optional("submitted_by"),
            },
            attachment: parsed.file,
        })
    }
}

// ---------------------------------------------------------------------------
// GET /tickets
// ---------------------------------------------------------------------------

/// List tickets, newest number first, optionally filtered by title.
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let pattern = title_filter_pattern(params.q.as_deref());
    let tickets = TicketRepo::list(&state.pool, pattern.as_deref()).await?;
    Ok(Json(DataResponse { data: tickets }))
}

// ---------------------------------------------------------------------------
// GET /tickets/new
// ---------------------------------------------------------------------------

pub async fn new_ticket_form(State(state): State<AppState>) -> Json<DataResponse<FormDescriptor>> {
    Json(DataResponse {
        data: forms::new_ticket_form(state.uploads.allowed_extensions()),
    })
}

// ---------------------------------------------------------------------------
// POST /tickets/new
// ---------------------------------------------------------------------------

/// File a ticket, optionally with one attachment.
///
/// The attachment is checked before anything is written. The ticket row, the
/// attachment row and the file land together; see [`commit_with_upload`] for
/// what a failed commit leaves behind.
pub async fn create_ticket(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    submission: TicketSubmission,
) -> AppResult<impl IntoResponse> {
    let TicketSubmission { form, attachment } = submission;
    validate_title(&form.title)?;
    validate_body("Description", &form.description)?;

    let pending = attachment
        .map(|(name, bytes)| state.uploads.accept(&name, bytes))
        .transpose()?;

    let input = NewTicket {
        authenticated_username: auth.as_ref().map(|u| u.username.clone()),
        submitted_by: form.submitted_by,
        creator_id: auth.as_ref().map(|u| u.user_id),
        title: form.title.trim().to_string(),
        description: form.description,
    };

    let mut attempt = 1;
    let ticket = loop {
        match file_ticket(&state, &input, pending.as_ref()).await {
            Ok(ticket) => break ticket,
            Err(e) => {
                retry_numbering(e, attempt)?;
                tracing::warn!(attempt, "Ticket number taken concurrently, retrying");
                attempt += 1;
            }
        }
    };

    tracing::info!(
        ticket_id = ticket.id,
        ticket_number = ticket.ticket_number,
        submitted_by = %ticket.submitted_by,
        has_attachment = pending.is_some(),
        "Ticket filed",
    );

    let detail = load_detail(&state, ticket.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// Whether a failed filing attempt may be retried.
///
/// Only a clash on the ticket number is retried, up to
/// [`MAX_NUMBERING_ATTEMPTS`] attempts in total; the last clash becomes a 409.
/// The numbering lock in `TicketRepo::create_next` normally rules clashes out,
/// so this only fires if a number is inserted outside that path.
fn retry_numbering(err: AppError, attempt: u32) -> AppResult<()> {
    match err {
        AppError::Database(e) if is_unique_violation(&e, TICKET_NUMBER_CONSTRAINT) => {
            if attempt < MAX_NUMBERING_ATTEMPTS {
                Ok(())
            } else {
                Err(AppError::Core(CoreError::Conflict(
                    "Could not allocate a ticket number, please retry".into(),
                )))
            }
        }
        other => Err(other),
    }
}

/// One attempt at filing a ticket in its own transaction.
async fn file_ticket(
    state: &AppState,
    input: &NewTicket,
    upload: Option<&PendingUpload>,
) -> AppResult<Ticket> {
    let mut tx = state.pool.begin().await?;
    let ticket = TicketRepo::create_next(&mut *tx, input).await?;
    if let Some(upload) = upload {
        AttachmentRepo::create(&mut *tx, ticket.id, &upload.filename).await?;
    }
    commit_with_upload(tx, &state.uploads, upload).await?;
    Ok(ticket)
}

/// Write the file (if any), then commit.
///
/// A failed write rolls the transaction back. A failed commit removes the
/// new file if no upload of that name existed before. If one did, its old
/// bytes were already replaced and are not restored: the rows roll back but
/// the stored file keeps the newer contents, as with any last-write-wins
/// upload.
async fn commit_with_upload(
    tx: Transaction<'_, Postgres>,
    uploads: &UploadStore,
    upload: Option<&PendingUpload>,
) -> AppResult<()> {
    let Some(upload) = upload else {
        tx.commit().await?;
        return Ok(());
    };

    let existed = uploads.exists(&upload.filename).await;
    uploads
        .write(upload)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store attachment: {e}")))?;

    if let Err(e) = tx.commit().await {
        if !existed {
            if let Err(rm) = uploads.remove(&upload.filename).await {
                tracing::warn!(filename = %upload.filename, error = %rm, "Failed to remove orphaned upload");
            }
        }
        return Err(e.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GET /tickets/{id}
// ---------------------------------------------------------------------------

/// A ticket with its comments (oldest first) and attachments.
pub async fn view_ticket(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let detail = load_detail(&state, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<TicketDetail> {
    TicketRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))
}

async fn ensure_ticket_exists(state: &AppState, id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/comment
// ---------------------------------------------------------------------------

/// Append a comment authored by the current user.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    FormInput(input): FormInput<CommentForm>,
) -> AppResult<impl IntoResponse> {
    validate_body("Comment", &input.body)?;
    ensure_ticket_exists(&state, id).await?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            ticket_id: id,
            author: auth.username,
            body: input.body,
        },
    )
    .await?;

    tracing::info!(ticket_id = id, comment_id = comment.id, user_id = auth.user_id, "Comment added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/status
// ---------------------------------------------------------------------------

/// Move a ticket to a new status. Closing stamps `finished_at`; any other
/// status clears it.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    FormInput(input): FormInput<StatusForm>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let status = normalize_status(&input.status)?;
    let finished_at = finished_at_for(status, Utc::now());

    let ticket = TicketRepo::update_status(&state.pool, id, status, finished_at)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(ticket_id = id, status, user_id = auth.user_id, "Ticket status updated");

    Ok(Json(DataResponse { data: ticket }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/assign
// ---------------------------------------------------------------------------

/// Assign a ticket to a user by username, or clear the assignment.
pub async fn assign_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    FormInput(input): FormInput<AssignForm>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    ensure_ticket_exists(&state, id).await?;

    let assignee_id = match input.assignee.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            let user = UserRepo::find_by_username(&state.pool, name)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!("Unknown user '{name}'")))
                })?;
            Some(user.id)
        }
        _ => None,
    };

    let ticket = TicketRepo::set_assignee(&state.pool, id, assignee_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(ticket_id = id, ?assignee_id, user_id = auth.user_id, "Ticket assignment changed");

    Ok(Json(DataResponse { data: ticket }))
}

// ---------------------------------------------------------------------------
// POST /tickets/{id}/attach, POST /tickets/{id}/upload
// ---------------------------------------------------------------------------

/// Attach a file to an existing ticket. A file with the same sanitized name
/// replaces the stored bytes; both attachment rows then point at it.
pub async fn upload_attachment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    ensure_ticket_exists(&state, id).await?;

    let parsed = MultipartForm::read(multipart).await?;
    let (name, bytes) = parsed.file.ok_or_else(|| {
        AppError::Core(CoreError::Validation("No file was uploaded".into()))
    })?;
    let upload = state.uploads.accept(&name, bytes)?;

    let mut tx = state.pool.begin().await?;
    let attachment = AttachmentRepo::create(&mut *tx, id, &upload.filename).await?;
    commit_with_upload(tx, &state.uploads, Some(&upload)).await?;

    tracing::info!(
        ticket_id = id,
        attachment_id = attachment.id,
        filename = %attachment.filename,
        user_id = auth.user_id,
        "Attachment uploaded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: attachment })))
}
