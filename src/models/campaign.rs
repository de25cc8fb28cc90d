//! Campaign entity model
//!
//! Campaigns group leads by acquisition effort. Names are unique because CSV
//! ingestion resolves campaigns by name.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Campaign entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    /// Unique identifier for the campaign (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Campaign name, unique across the instance
    pub name: String,

    /// Ad platform the campaign runs on (optional, free text)
    pub platform: Option<String>,

    /// Timestamp when the campaign was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
