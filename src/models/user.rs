//! User entity model
//!
//! This module contains the SeaORM entity model for the users table and the
//! fixed role set that drives every access-control decision.

use super::team::Entity as Team;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User entity with role and optional team membership
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email, unique across the instance
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Role drawn from the fixed set (stored as text)
    pub role: Role,

    /// Team membership (optional)
    pub team_id: Option<Uuid>,

    /// Timestamp when the user was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the user was last updated
    pub updated_at: DateTimeWithTimeZone,
}

/// The fixed role set. Visibility rules are a per-role rule table, not a
/// hierarchy constant.
#[derive(
    Copy,
    Clone,
    Debug,
    EnumIter,
    DeriveActiveEnum,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "marketing")]
    Marketing,
}

impl Role {
    /// Admins and super admins bypass ownership checks everywhere.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Team",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
}

impl Related<Team> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
