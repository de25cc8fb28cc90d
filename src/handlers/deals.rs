//! # Deal API Handlers
//!
//! Deal visibility always flows through the deal's lead. Creation checks
//! lead existence (404) before lead access (403), then validates that the
//! requested stage belongs to the requested pipeline. Updates apply fields
//! as given: the open/won/lost state is derived and not transition-checked.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::authz::{self, Actor, LeadOwnership};
use crate::error::{ApiError, forbidden, not_found, validation_error};
use crate::models::deal::{DealState, Model as DealModel};
use crate::repositories::{
    CreateDealRequest, DealRepository, LeadRepository, PipelineRepository, UpdateDealRequest,
};
use crate::server::AppState;

use super::double_option;
use super::leads::load_lead_for;

/// Deal representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DealDto {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub won: bool,
    pub lost_reason: Option<String>,
    /// Derived lifecycle state (open, won or lost)
    pub state: DealState,
    pub created_by: Uuid,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl From<DealModel> for DealDto {
    fn from(deal: DealModel) -> Self {
        let state = deal.state();
        Self {
            id: deal.id,
            lead_id: deal.lead_id,
            pipeline_id: deal.pipeline_id,
            stage_id: deal.stage_id,
            title: deal.title,
            amount_cents: deal.amount_cents,
            currency: deal.currency,
            won: deal.won,
            lost_reason: deal.lost_reason,
            state,
            created_by: deal.created_by,
            created_at: deal.created_at.to_rfc3339(),
            updated_at: deal.updated_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a deal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDealDto {
    pub lead_id: Uuid,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    #[schema(example = "Annual subscription")]
    pub title: String,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
}

/// Request payload for partially updating a deal
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDealDto {
    pub title: Option<String>,
    pub stage_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub amount_cents: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub currency: Option<Option<String>>,
    pub won: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub lost_reason: Option<Option<String>>,
}

/// Validate that a stage exists and belongs to the given pipeline.
async fn ensure_stage_in_pipeline(
    state: &AppState,
    pipeline_id: Uuid,
    stage_id: Uuid,
) -> Result<(), ApiError> {
    let repo = PipelineRepository::new(&state.db);

    if repo.find_by_id(pipeline_id).await?.is_none() {
        return Err(validation_error(
            "Unknown pipeline",
            serde_json::json!({ "pipeline_id": pipeline_id.to_string() }),
        ));
    }

    match repo.find_stage(stage_id).await? {
        Some(stage) if stage.pipeline_id == pipeline_id => Ok(()),
        Some(_) => Err(validation_error(
            "Stage does not belong to the pipeline",
            serde_json::json!({ "stage_id": stage_id.to_string() }),
        )),
        None => Err(validation_error(
            "Unknown stage",
            serde_json::json!({ "stage_id": stage_id.to_string() }),
        )),
    }
}

/// Resolve a deal and check the requester may see it (through its lead).
async fn load_deal_for(
    state: &AppState,
    actor: &Actor,
    deal_id: Uuid,
) -> Result<DealModel, ApiError> {
    let repo = DealRepository::new(&state.db);
    let (deal, _lead) = repo
        .find_with_lead(deal_id)
        .await?
        .ok_or_else(|| not_found("Deal"))?;

    // Re-resolve through the lead repo so the owner's team is available
    load_lead_for(state, actor, deal.lead_id).await?;

    Ok(deal)
}

/// List deals whose lead is visible to the requester
#[utoipa::path(
    get,
    path = "/api/deals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deals visible to the requester", body = [DealDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "deals"
)]
pub async fn list_deals(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DealDto>>, ApiError> {
    let actor = Actor::from(&user);
    let repo = DealRepository::new(&state.db);

    let deals = repo.list(authz::lead_scope(&actor)).await?;
    Ok(Json(deals.into_iter().map(DealDto::from).collect()))
}

/// Create a deal on a lead
#[utoipa::path(
    post,
    path = "/api/deals",
    security(("bearer_auth" = [])),
    request_body = CreateDealDto,
    responses(
        (status = 201, description = "Deal created", body = DealDto),
        (status = 400, description = "Unknown pipeline/stage or stage outside pipeline", body = ApiError),
        (status = 403, description = "Lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError)
    ),
    tag = "deals"
)]
pub async fn create_deal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateDealDto>,
) -> Result<(StatusCode, Json<DealDto>), ApiError> {
    // Lead existence and access come first: 404 for a missing lead, 403 for
    // a lead the requester cannot see, even when the lead exists.
    load_lead_for(&state, &Actor::from(&user), request.lead_id).await?;

    ensure_stage_in_pipeline(&state, request.pipeline_id, request.stage_id).await?;

    let repo = DealRepository::new(&state.db);
    let deal = repo
        .create(CreateDealRequest {
            lead_id: request.lead_id,
            pipeline_id: request.pipeline_id,
            stage_id: request.stage_id,
            title: request.title,
            amount_cents: request.amount_cents,
            currency: request.currency,
            created_by: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DealDto::from(deal))))
}

/// Get a deal by ID
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Deal UUID")),
    responses(
        (status = 200, description = "Deal", body = DealDto),
        (status = 403, description = "Deal's lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Deal not found", body = ApiError)
    ),
    tag = "deals"
)]
pub async fn get_deal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(deal_id): Path<Uuid>,
) -> Result<Json<DealDto>, ApiError> {
    let deal = load_deal_for(&state, &Actor::from(&user), deal_id).await?;
    Ok(Json(DealDto::from(deal)))
}

/// Partially update a deal
#[utoipa::path(
    patch,
    path = "/api/deals/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Deal UUID")),
    request_body = UpdateDealDto,
    responses(
        (status = 200, description = "Updated deal", body = DealDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Deal's lead is not visible to the requester", body = ApiError),
        (status = 404, description = "Deal not found", body = ApiError)
    ),
    tag = "deals"
)]
pub async fn update_deal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(deal_id): Path<Uuid>,
    Json(request): Json<UpdateDealDto>,
) -> Result<Json<DealDto>, ApiError> {
    let deal = load_deal_for(&state, &Actor::from(&user), deal_id).await?;

    // A stage move must stay inside the deal's pipeline.
    if let Some(stage_id) = request.stage_id {
        ensure_stage_in_pipeline(&state, deal.pipeline_id, stage_id).await?;
    }

    let repo = DealRepository::new(&state.db);
    let updated = repo
        .update(
            deal,
            UpdateDealRequest {
                title: request.title,
                stage_id: request.stage_id,
                amount_cents: request.amount_cents,
                currency: request.currency,
                won: request.won,
                lost_reason: request.lost_reason,
            },
        )
        .await?;

    Ok(Json(DealDto::from(updated)))
}

/// Delete a deal
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Deal UUID")),
    responses(
        (status = 204, description = "Deal deleted"),
        (status = 403, description = "Requester may not delete this deal", body = ApiError),
        (status = 404, description = "Deal not found", body = ApiError)
    ),
    tag = "deals"
)]
pub async fn delete_deal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(deal_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let actor = Actor::from(&user);
    let repo = DealRepository::new(&state.db);

    let (deal, _) = repo
        .find_with_lead(deal_id)
        .await?
        .ok_or_else(|| not_found("Deal"))?;

    let lead_repo = LeadRepository::new(&state.db);
    let ownership = match lead_repo.find_with_owner(deal.lead_id).await? {
        Some((lead, owner)) => LeadOwnership::resolve(lead.owner_user_id, owner.as_ref()),
        None => LeadOwnership::default(),
    };

    // Write-path rule: creator-only for sales/marketing, lead rule for
    // managers, unconditional for admins.
    if !authz::can_delete_deal(&actor, deal.created_by, &ownership) {
        return Err(forbidden(None));
    }

    repo.delete(deal).await?;
    Ok(StatusCode::NO_CONTENT)
}
