//! # Pipeline API Handlers
//!
//! Pipelines carry their ordered stage ladder. Creation and deletion are
//! admin operations; deletion cascades to stages.

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
use crate::models::pipeline::Model as PipelineModel;
use crate::models::stage::Model as StageModel;
use crate::repositories::{CreatePipelineRequest, PipelineRepository};
use crate::server::AppState;

/// Stage representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StageDto {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
}

impl From<StageModel> for StageDto {
    fn from(stage: StageModel) -> Self {
        Self {
            id: stage.id,
            name: stage.name,
            position: stage.position,
        }
    }
}

/// Pipeline representation with its ordered stages
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PipelineDto {
    pub id: Uuid,
    pub name: String,
    pub stages: Vec<StageDto>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl PipelineDto {
    fn from_parts(pipeline: PipelineModel, stages: Vec<StageModel>) -> Self {
        Self {
            id: pipeline.id,
            name: pipeline.name,
            stages: stages.into_iter().map(StageDto::from).collect(),
            created_at: pipeline.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a pipeline
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePipelineDto {
    #[schema(example = "Enterprise Pipeline")]
    pub name: String,
    /// Stage names in display order
    pub stages: Vec<String>,
}

/// List pipelines with their stages
#[utoipa::path(
    get,
    path = "/api/pipelines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All pipelines with ordered stages", body = [PipelineDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "pipelines"
)]
pub async fn list_pipelines(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<PipelineDto>>, ApiError> {
    let repo = PipelineRepository::new(&state.db);
    let pipelines = repo.list_with_stages().await?;

    Ok(Json(
        pipelines
            .into_iter()
            .map(|(pipeline, stages)| PipelineDto::from_parts(pipeline, stages))
            .collect(),
    ))
}

/// Create a pipeline with its stage ladder
#[utoipa::path(
    post,
    path = "/api/pipelines",
    security(("bearer_auth" = [])),
    request_body = CreatePipelineDto,
    responses(
        (status = 201, description = "Pipeline created", body = PipelineDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Requester is not an admin", body = ApiError)
    ),
    tag = "pipelines"
)]
pub async fn create_pipeline(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(request): Json<CreatePipelineDto>,
) -> Result<(StatusCode, Json<PipelineDto>), ApiError> {
    let repo = PipelineRepository::new(&state.db);
    let (pipeline, stages) = repo
        .create(CreatePipelineRequest {
            name: request.name,
            stages: request.stages,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PipelineDto::from_parts(pipeline, stages)),
    ))
}

/// Delete a pipeline and its stages
#[utoipa::path(
    delete,
    path = "/api/pipelines/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pipeline UUID")),
    responses(
        (status = 204, description = "Pipeline deleted"),
        (status = 403, description = "Requester is not an admin", body = ApiError),
        (status = 404, description = "Pipeline not found", body = ApiError)
    ),
    tag = "pipelines"
)]
pub async fn delete_pipeline(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(pipeline_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = PipelineRepository::new(&state.db);
    let pipeline = repo
        .find_by_id(pipeline_id)
        .await?
        .ok_or_else(|| not_found("Pipeline"))?;

    repo.delete(pipeline).await?;
    Ok(StatusCode::NO_CONTENT)
}
