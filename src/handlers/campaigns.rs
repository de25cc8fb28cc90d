//! # Campaign API Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, not_found};
use crate::models::ad_spend::Model as AdSpendModel;
use crate::models::campaign::Model as CampaignModel;
use crate::repositories::{AdSpendRepository, CampaignRepository, CreateCampaignRequest};
use crate::server::AppState;

/// Campaign representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignDto {
    pub id: Uuid,
    pub name: String,
    pub platform: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl From<CampaignModel> for CampaignDto {
    fn from(campaign: CampaignModel) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            platform: campaign.platform,
            created_at: campaign.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a campaign
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCampaignDto {
    #[schema(example = "Spring Promo")]
    pub name: String,
    #[schema(example = "meta")]
    pub platform: Option<String>,
}

/// Daily spend record for a campaign
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdSpendDto {
    pub id: Uuid,
    pub campaign_id: Uuid,
    /// Day the spend was incurred (YYYY-MM-DD)
    pub spend_date: String,
    pub amount_cents: i64,
    pub currency: String,
}

impl From<AdSpendModel> for AdSpendDto {
    fn from(record: AdSpendModel) -> Self {
        Self {
            id: record.id,
            campaign_id: record.campaign_id,
            spend_date: record.spend_date.to_string(),
            amount_cents: record.amount_cents,
            currency: record.currency,
        }
    }
}

/// List campaigns
#[utoipa::path(
    get,
    path = "/api/campaigns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All campaigns", body = [CampaignDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "campaigns"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<CampaignDto>>, ApiError> {
    let repo = CampaignRepository::new(&state.db);
    let campaigns = repo.list().await?;

    Ok(Json(campaigns.into_iter().map(CampaignDto::from).collect()))
}

/// Create a campaign
#[utoipa::path(
    post,
    path = "/api/campaigns",
    security(("bearer_auth" = [])),
    request_body = CreateCampaignDto,
    responses(
        (status = 201, description = "Campaign created", body = CampaignDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "A campaign with this name exists", body = ApiError)
    ),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(request): Json<CreateCampaignDto>,
) -> Result<(StatusCode, Json<CampaignDto>), ApiError> {
    let repo = CampaignRepository::new(&state.db);
    let campaign = repo
        .create(CreateCampaignRequest {
            name: request.name,
            platform: request.platform,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CampaignDto::from(campaign))))
}

/// List spend records for a campaign
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/spend",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Campaign UUID")),
    responses(
        (status = 200, description = "Spend records, most recent day first", body = [AdSpendDto]),
        (status = 404, description = "Campaign not found", body = ApiError)
    ),
    tag = "campaigns"
)]
pub async fn list_campaign_spend(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<AdSpendDto>>, ApiError> {
    let campaigns = CampaignRepository::new(&state.db);
    let campaign = campaigns
        .find_by_id(campaign_id)
        .await?
        .ok_or_else(|| not_found("Campaign"))?;

    let spend = AdSpendRepository::new(&state.db)
        .list_for_campaign(campaign.id)
        .await?;

    Ok(Json(spend.into_iter().map(AdSpendDto::from).collect()))
}
