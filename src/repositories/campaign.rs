//! # Campaign Repository
//!
//! Campaign names are unique; CSV ingestion resolves campaigns by exact name.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::campaign::{
    ActiveModel as CampaignActiveModel, Column, Entity as Campaign, Model as CampaignModel,
};

/// Request data for creating a new campaign
#[derive(Debug, Clone)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub platform: Option<String>,
}

/// Repository for Campaign database operations
pub struct CampaignRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CampaignRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new campaign. The unique index on name surfaces duplicates
    /// as a conflict.
    pub async fn create(
        &self,
        request: CreateCampaignRequest,
    ) -> Result<CampaignModel, RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation("Campaign name cannot be empty"));
        }

        let campaign = CampaignActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            platform: Set(request.platform),
            created_at: Set(Utc::now().into()),
        };

        Ok(campaign.insert(self.db).await?)
    }

    /// Get a campaign by ID
    pub async fn find_by_id(
        &self,
        campaign_id: Uuid,
    ) -> Result<Option<CampaignModel>, RepositoryError> {
        Ok(Campaign::find_by_id(campaign_id).one(self.db).await?)
    }

    /// Get a campaign by exact name (CSV row resolution).
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CampaignModel>, RepositoryError> {
        Ok(Campaign::find()
            .filter(Column::Name.eq(name.trim()))
            .one(self.db)
            .await?)
    }

    /// List all campaigns, newest first.
    pub async fn list(&self) -> Result<Vec<CampaignModel>, RepositoryError> {
        Ok(Campaign::find()
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await?)
    }
}
