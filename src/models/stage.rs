//! Stage entity model
//!
//! A stage belongs to exactly one pipeline; `position` orders stages within
//! their pipeline and is unique per pipeline.

use super::pipeline::Entity as Pipeline;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Stage entity within a pipeline
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    /// Unique identifier for the stage (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning pipeline
    pub pipeline_id: Uuid,

    /// Display name for the stage
    pub name: String,

    /// Order within the pipeline (0-based, unique per pipeline)
    pub position: i32,

    /// Timestamp when the stage was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Pipeline",
        from = "Column::PipelineId",
        to = "super::pipeline::Column::Id"
    )]
    Pipeline,
}

impl Related<Pipeline> for Entity {
    fn to() -> RelationDef {
        Relation::Pipeline.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
