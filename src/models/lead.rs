//! Lead entity model
//!
//! This module contains the SeaORM entity model for the leads table, the
//! central entity of the CRM, plus the source and status enums stored as
//! text columns.

use super::campaign::Entity as Campaign;
use super::team::Entity as Team;
use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Lead entity: contact fields, acquisition source, pipeline status and
/// optional ownership links.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    /// Unique identifier for the lead (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Contact name
    pub full_name: String,

    /// Contact phone (optional; a lead must have phone or email)
    pub phone: Option<String>,

    /// Contact email (optional; a lead must have phone or email)
    pub email: Option<String>,

    pub country: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,

    /// Acquisition channel (stored as text)
    pub source: LeadSource,

    /// Pipeline stage of the lead (stored as text)
    pub status: LeadStatus,

    /// Owning user (optional). Ownership drives sales/marketing visibility.
    pub owner_user_id: Option<Uuid>,

    /// Team grouping (optional)
    pub team_id: Option<Uuid>,

    /// Campaign the lead was acquired through (optional)
    pub campaign_id: Option<Uuid>,

    /// UTM attribution captured at intake
    #[sea_orm(column_type = "JsonBinary")]
    pub utm: Option<JsonValue>,

    /// Opaque ingestion payload (webhook body or CSV row) kept verbatim
    #[sea_orm(column_type = "JsonBinary")]
    pub raw_payload: Option<JsonValue>,

    /// Timestamp when the lead was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the lead was last updated
    pub updated_at: DateTimeWithTimeZone,
}

/// Acquisition channel for a lead
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
pub enum LeadSource {
    #[sea_orm(string_value = "meta")]
    Meta,
    #[sea_orm(string_value = "tiktok")]
    Tiktok,
    #[sea_orm(string_value = "wordpress")]
    Wordpress,
    #[sea_orm(string_value = "csv_import")]
    CsvImport,
    #[sea_orm(string_value = "manual")]
    Manual,
}

/// Pipeline stage of a lead
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
pub enum LeadStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "qualified")]
    Qualified,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "unqualified")]
    Unqualified,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::OwnerUserId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "Team",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "Campaign",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<Team> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<Campaign> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
