//! # Lead Note API Handlers
//!
//! Notes are nested under their lead. The lead is resolved first so a
//! missing lead is always 404, never 403, and the access predicate runs
//! before any note is read or written.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::authz::Actor;
use crate::error::ApiError;
use crate::models::lead_note::Model as NoteModel;
use crate::repositories::LeadNoteRepository;
use crate::server::AppState;

use super::leads::load_lead_for;

/// Note representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteDto {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl From<NoteModel> for NoteDto {
    fn from(note: NoteModel) -> Self {
        Self {
            id: note.id,
            lead_id: note.lead_id,
            user_id: note.user_id,
            body: note.body,
            created_at: note.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a note
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteDto {
    /// Note text; must be non-empty after trimming
    #[schema(example = "Called, asked to follow up next week")]
    pub body: String,
}

/// List notes on a lead
#[utoipa::path(
    get,
    path = "/api/leads/{lead_id}/notes",
    security(("bearer_auth" = [])),
    params(("lead_id" = Uuid, Path, description = "Lead UUID")),
    responses(
        (status = 200, description = "Notes on the lead, newest first", body = [NoteDto]),
        (status = 403, description = "Lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "notes"
)]
pub async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<Vec<NoteDto>>, ApiError> {
    let lead = load_lead_for(&state, &Actor::from(&user), lead_id).await?;

    let repo = LeadNoteRepository::new(&state.db);
    let notes = repo.list_for_lead(lead.id).await?;

    Ok(Json(notes.into_iter().map(NoteDto::from).collect()))
}

/// Create a note on a lead
#[utoipa::path(
    post,
    path = "/api/leads/{lead_id}/notes",
    security(("bearer_auth" = [])),
    params(("lead_id" = Uuid, Path, description = "Lead UUID")),
    request_body = CreateNoteDto,
    responses(
        (status = 201, description = "Note created", body = NoteDto),
        (status = 400, description = "Empty note body", body = ApiError),
        (status = 403, description = "Lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "notes"
)]
pub async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lead_id): Path<Uuid>,
    Json(request): Json<CreateNoteDto>,
) -> Result<(StatusCode, Json<NoteDto>), ApiError> {
    let lead = load_lead_for(&state, &Actor::from(&user), lead_id).await?;

    let repo = LeadNoteRepository::new(&state.db);
    let note = repo.create(lead.id, user.id, &request.body).await?;

    Ok((StatusCode::CREATED, Json(NoteDto::from(note))))
}
