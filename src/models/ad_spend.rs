//! Ad spend entity model
//!
//! Daily spend records per campaign, ingested from CSV uploads. Amounts are
//! integer cents.

use super::campaign::Entity as Campaign;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Ad spend record
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ad_spend")]
pub struct Model {
    /// Unique identifier (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Campaign the spend belongs to
    pub campaign_id: Uuid,

    /// Day the spend was incurred
    pub spend_date: Date,

    /// Spend in integer cents
    pub amount_cents: i64,

    /// ISO currency code
    pub currency: String,

    /// Timestamp when the record was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Campaign",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
}

impl Related<Campaign> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
