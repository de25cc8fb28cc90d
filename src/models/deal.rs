//! Deal entity model
//!
//! A deal references a lead, a pipeline and a stage within that pipeline.
//! The open/won/lost state is derived from `won` and `lost_reason`; it is
//! never stored as its own column and no transition rules are enforced on
//! updates.

use super::lead::Entity as Lead;
use super::pipeline::Entity as Pipeline;
use super::stage::Entity as Stage;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Deal entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    /// Unique identifier for the deal (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lead the deal belongs to
    pub lead_id: Uuid,

    /// Pipeline the deal moves through
    pub pipeline_id: Uuid,

    /// Current stage (must belong to `pipeline_id`)
    pub stage_id: Uuid,

    /// Short description of the deal
    pub title: String,

    /// Deal value in integer cents (optional)
    pub amount_cents: Option<i64>,

    /// ISO currency code (optional)
    pub currency: Option<String>,

    /// Won flag
    pub won: bool,

    /// Reason the deal was lost (set implies lost)
    pub lost_reason: Option<String>,

    /// User that created the deal; drives the sales delete rule
    pub created_by: Uuid,

    /// Timestamp when the deal was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the deal was last updated
    pub updated_at: DateTimeWithTimeZone,
}

/// Derived lifecycle state of a deal
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DealState {
    Open,
    Won,
    Lost,
}

impl Model {
    /// Derive the lifecycle state. `won` takes precedence when both fields
    /// are set, since nothing stops a partial update from producing that
    /// combination.
    pub fn state(&self) -> DealState {
        if self.won {
            DealState::Won
        } else if self.lost_reason.is_some() {
            DealState::Lost
        } else {
            DealState::Open
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Lead",
        from = "Column::LeadId",
        to = "super::lead::Column::Id"
    )]
    Lead,
    #[sea_orm(
        belongs_to = "Pipeline",
        from = "Column::PipelineId",
        to = "super::pipeline::Column::Id"
    )]
    Pipeline,
    #[sea_orm(
        belongs_to = "Stage",
        from = "Column::StageId",
        to = "super::stage::Column::Id"
    )]
    Stage,
    #[sea_orm(
        belongs_to = "User",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<Lead> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl Related<Stage> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deal(won: bool, lost_reason: Option<&str>) -> Model {
        Model {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            pipeline_id: Uuid::new_v4(),
            stage_id: Uuid::new_v4(),
            title: "Test deal".to_string(),
            amount_cents: Some(10_000),
            currency: Some("USD".to_string()),
            won,
            lost_reason: lost_reason.map(str::to_string),
            created_by: Uuid::new_v4(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn open_when_neither_flag_set() {
        assert_eq!(deal(false, None).state(), DealState::Open);
    }

    #[test]
    fn won_when_flag_set() {
        assert_eq!(deal(true, None).state(), DealState::Won);
    }

    #[test]
    fn lost_when_reason_set() {
        assert_eq!(deal(false, Some("budget cut")).state(), DealState::Lost);
    }

    #[test]
    fn won_takes_precedence_over_lost_reason() {
        // Partial updates can persist any combination; won wins when both
        // fields are set.
        assert_eq!(deal(true, Some("budget cut")).state(), DealState::Won);
    }
}
