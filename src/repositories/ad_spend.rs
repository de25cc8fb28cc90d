//! # Ad Spend Repository

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::ad_spend::{
    ActiveModel as AdSpendActiveModel, Column, Entity as AdSpend, Model as AdSpendModel,
};

/// Repository for AdSpend database operations
pub struct AdSpendRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdSpendRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record one day of spend for a campaign.
    pub async fn create(
        &self,
        campaign_id: Uuid,
        spend_date: NaiveDate,
        amount_cents: i64,
        currency: &str,
    ) -> Result<AdSpendModel, RepositoryError> {
        if currency.trim().is_empty() {
            return Err(RepositoryError::validation("Currency cannot be empty"));
        }
        if amount_cents < 0 {
            return Err(RepositoryError::validation("Spend cannot be negative"));
        }

        let record = AdSpendActiveModel {
            id: Set(Uuid::new_v4()),
            campaign_id: Set(campaign_id),
            spend_date: Set(spend_date),
            amount_cents: Set(amount_cents),
            currency: Set(currency.trim().to_uppercase()),
            created_at: Set(Utc::now().into()),
        };

        Ok(record.insert(self.db).await?)
    }

    /// List spend records for a campaign, most recent day first.
    pub async fn list_for_campaign(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<AdSpendModel>, RepositoryError> {
        Ok(AdSpend::find()
            .filter(Column::CampaignId.eq(campaign_id))
            .order_by_desc(Column::SpendDate)
            .all(self.db)
            .await?)
    }
}
