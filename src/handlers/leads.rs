//! # Lead API Handlers
//!
//! CRUD endpoints for leads. Every point read resolves the lead first (404
//! before any access decision) and then consults the policy module.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::authz::{self, Actor, LeadOwnership};
use crate::error::{ApiError, forbidden, not_found};
use crate::models::lead::Model as LeadModel;
use crate::models::{LeadSource, LeadStatus, Role};
use crate::repositories::{CreateLeadRequest, LeadRepository, UpdateLeadRequest};
use crate::server::AppState;

use super::double_option;

/// Lead representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadDto {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub owner_user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub utm: Option<JsonValue>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl From<LeadModel> for LeadDto {
    fn from(lead: LeadModel) -> Self {
        Self {
            id: lead.id,
            full_name: lead.full_name,
            phone: lead.phone,
            email: lead.email,
            country: lead.country,
            city: lead.city,
            language: lead.language,
            source: lead.source,
            status: lead.status,
            owner_user_id: lead.owner_user_id,
            team_id: lead.team_id,
            campaign_id: lead.campaign_id,
            utm: lead.utm,
            created_at: lead.created_at.to_rfc3339(),
            updated_at: lead.updated_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a lead
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateLeadDto {
    #[schema(example = "Jane Smith")]
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
    /// Acquisition channel; defaults to manual entry
    pub source: Option<LeadSource>,
    pub owner_user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub utm: Option<JsonValue>,
}

/// Request payload for partially updating a lead
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLeadDto {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub language: Option<Option<String>>,
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub owner_user_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub team_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub campaign_id: Option<Option<Uuid>>,
}

/// Fetch a lead with its owner resolved, mapping absence to 404 and a policy
/// denial to 403.
pub(crate) async fn load_lead_for(
    state: &AppState,
    actor: &Actor,
    lead_id: Uuid,
) -> Result<LeadModel, ApiError> {
    let repo = LeadRepository::new(&state.db);
    let (lead, owner) = repo
        .find_with_owner(lead_id)
        .await?
        .ok_or_else(|| not_found("Lead"))?;

    let ownership = LeadOwnership::resolve(lead.owner_user_id, owner.as_ref());
    if !authz::can_access_lead(actor, &ownership) {
        return Err(forbidden(None));
    }

    Ok(lead)
}

/// List leads visible to the requesting user
#[utoipa::path(
    get,
    path = "/api/leads",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Leads visible to the requester", body = [LeadDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn list_leads(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<LeadDto>>, ApiError> {
    let actor = Actor::from(&user);
    let repo = LeadRepository::new(&state.db);

    let leads = repo.list(authz::lead_scope(&actor)).await?;
    Ok(Json(leads.into_iter().map(LeadDto::from).collect()))
}

/// Create a lead
#[utoipa::path(
    post,
    path = "/api/leads",
    security(("bearer_auth" = [])),
    request_body = CreateLeadDto,
    responses(
        (status = 201, description = "Lead created", body = LeadDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateLeadDto>,
) -> Result<(StatusCode, Json<LeadDto>), ApiError> {
    // Sales and marketing default to owning what they create; their scope
    // would otherwise hide the new lead from them immediately.
    let owner_user_id = match user.role {
        Role::Sales | Role::Marketing => Some(request.owner_user_id.unwrap_or(user.id)),
        _ => request.owner_user_id,
    };

    let repo = LeadRepository::new(&state.db);
    let lead = repo
        .create(CreateLeadRequest {
            full_name: request.full_name,
            phone: request.phone,
            email: request.email,
            country: request.country,
            city: request.city,
            language: request.language,
            source: request.source.unwrap_or(LeadSource::Manual),
            owner_user_id,
            team_id: request.team_id.or(user.team_id),
            campaign_id: request.campaign_id,
            utm: request.utm,
            raw_payload: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LeadDto::from(lead))))
}

/// Get a lead by ID
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead UUID")),
    responses(
        (status = 200, description = "Lead", body = LeadDto),
        (status = 403, description = "Lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn get_lead(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lead_id): Path<Uuid>,
) -> Result<Json<LeadDto>, ApiError> {
    let lead = load_lead_for(&state, &Actor::from(&user), lead_id).await?;
    Ok(Json(LeadDto::from(lead)))
}

/// Partially update a lead
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead UUID")),
    request_body = UpdateLeadDto,
    responses(
        (status = 200, description = "Updated lead", body = LeadDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn update_lead(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lead_id): Path<Uuid>,
    Json(request): Json<UpdateLeadDto>,
) -> Result<Json<LeadDto>, ApiError> {
    let lead = load_lead_for(&state, &Actor::from(&user), lead_id).await?;

    let repo = LeadRepository::new(&state.db);
    let updated = repo
        .update(
            lead,
            UpdateLeadRequest {
                full_name: request.full_name,
                phone: request.phone,
                email: request.email,
                country: request.country,
                city: request.city,
                language: request.language,
                status: request.status,
                owner_user_id: request.owner_user_id,
                team_id: request.team_id,
                campaign_id: request.campaign_id,
            },
        )
        .await?;

    Ok(Json(LeadDto::from(updated)))
}

/// Delete a lead (admin only; notes and deals cascade)
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lead UUID")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 403, description = "Requester is not an admin", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "leads"
)]
pub async fn delete_lead(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(lead_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = LeadRepository::new(&state.db);
    let lead = repo
        .find_by_id(lead_id)
        .await?
        .ok_or_else(|| not_found("Lead"))?;

    repo.delete(lead).await?;
    Ok(StatusCode::NO_CONTENT)
}
