//! # Pipeline Repository
//!
//! CRUD for pipelines and their ordered stage lists. Stages only exist
//! through their pipeline; deleting a pipeline cascades to its stages.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::pipeline::{
    ActiveModel as PipelineActiveModel, Entity as Pipeline, Model as PipelineModel,
};
use crate::models::stage::{
    ActiveModel as StageActiveModel, Column as StageColumn, Entity as Stage, Model as StageModel,
};

/// Request data for creating a new pipeline with its initial stages
#[derive(Debug, Clone)]
pub struct CreatePipelineRequest {
    pub name: String,
    /// Stage names in display order; positions are assigned from the order
    pub stages: Vec<String>,
}

/// Repository for Pipeline and Stage database operations
pub struct PipelineRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PipelineRepository<'a> {
    /// Create a new PipelineRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a pipeline and its stage ladder in input order.
    pub async fn create(
        &self,
        request: CreatePipelineRequest,
    ) -> Result<(PipelineModel, Vec<StageModel>), RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation("Pipeline name cannot be empty"));
        }
        if request.stages.is_empty() {
            return Err(RepositoryError::validation(
                "Pipeline must have at least one stage",
            ));
        }
        if request.stages.iter().any(|name| name.trim().is_empty()) {
            return Err(RepositoryError::validation("Stage names cannot be empty"));
        }

        let now = Utc::now();
        let pipeline = PipelineActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            created_at: Set(now.into()),
        };
        let pipeline = pipeline.insert(self.db).await?;

        let mut stages = Vec::with_capacity(request.stages.len());
        for (position, name) in request.stages.iter().enumerate() {
            let stage = StageActiveModel {
                id: Set(Uuid::new_v4()),
                pipeline_id: Set(pipeline.id),
                name: Set(name.trim().to_string()),
                position: Set(position as i32),
                created_at: Set(now.into()),
            };
            stages.push(stage.insert(self.db).await?);
        }

        Ok((pipeline, stages))
    }

    /// Get a pipeline by ID
    pub async fn find_by_id(
        &self,
        pipeline_id: Uuid,
    ) -> Result<Option<PipelineModel>, RepositoryError> {
        Ok(Pipeline::find_by_id(pipeline_id).one(self.db).await?)
    }

    /// List all pipelines with their stages in position order.
    pub async fn list_with_stages(
        &self,
    ) -> Result<Vec<(PipelineModel, Vec<StageModel>)>, RepositoryError> {
        Ok(Pipeline::find()
            .find_with_related(Stage)
            .order_by_asc(StageColumn::Position)
            .all(self.db)
            .await?)
    }

    /// Stages of one pipeline in position order.
    pub async fn stages_of(&self, pipeline_id: Uuid) -> Result<Vec<StageModel>, RepositoryError> {
        Ok(Stage::find()
            .filter(StageColumn::PipelineId.eq(pipeline_id))
            .order_by_asc(StageColumn::Position)
            .all(self.db)
            .await?)
    }

    /// Get a stage by ID
    pub async fn find_stage(&self, stage_id: Uuid) -> Result<Option<StageModel>, RepositoryError> {
        Ok(Stage::find_by_id(stage_id).one(self.db).await?)
    }

    /// Delete a pipeline; stages go with it.
    pub async fn delete(&self, pipeline: PipelineModel) -> Result<(), RepositoryError> {
        pipeline.delete(self.db).await?;
        Ok(())
    }

    /// Check whether any pipeline exists (used by startup seeding).
    pub async fn any_exists(&self) -> Result<bool, RepositoryError> {
        Ok(Pipeline::find().one(self.db).await?.is_some())
    }
}
