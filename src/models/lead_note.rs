//! Lead note entity model
//!
//! Free-text annotations on a lead, attributed to a user and cascade-deleted
//! with the lead.

use super::lead::Entity as Lead;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Lead note entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lead_notes")]
pub struct Model {
    /// Unique identifier for the note (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lead the note annotates
    pub lead_id: Uuid,

    /// Author of the note
    pub user_id: Uuid,

    /// Note text (non-empty)
    pub body: String,

    /// Timestamp when the note was created
    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "User",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<Lead> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
