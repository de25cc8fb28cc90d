//! # Integration Repository
//!
//! Per-user ad-platform credentials and Twilio settings. Secrets arrive here
//! already encrypted; this module never sees plaintext.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::integration::{
    ActiveModel as IntegrationActiveModel, Column, Entity as Integration,
    Model as IntegrationModel, Provider,
};
use crate::models::twilio_setting::{
    ActiveModel as TwilioActiveModel, Column as TwilioColumn, Entity as TwilioSetting,
    Model as TwilioModel,
};

/// Upsert payload for an ad-platform integration
#[derive(Debug, Clone)]
pub struct UpsertIntegrationRequest {
    pub user_id: Uuid,
    pub provider: Provider,
    pub credentials_ciphertext: Vec<u8>,
    pub settings: Option<JsonValue>,
}

/// Upsert payload for Twilio settings
#[derive(Debug, Clone)]
pub struct UpsertTwilioRequest {
    pub user_id: Uuid,
    pub account_sid: String,
    pub auth_token_ciphertext: Vec<u8>,
    pub phone_number: Option<String>,
}

/// Repository for Integration and TwilioSetting database operations
pub struct IntegrationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> IntegrationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create or replace the integration row for (user, provider).
    pub async fn upsert(
        &self,
        request: UpsertIntegrationRequest,
    ) -> Result<IntegrationModel, RepositoryError> {
        let now = Utc::now();

        let existing = Integration::find()
            .filter(Column::UserId.eq(request.user_id))
            .filter(Column::Provider.eq(request.provider))
            .one(self.db)
            .await?;

        match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.credentials_ciphertext = Set(request.credentials_ciphertext);
                active.settings = Set(request.settings);
                active.updated_at = Set(now.into());
                Ok(active.update(self.db).await?)
            }
            None => {
                let integration = IntegrationActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(request.user_id),
                    provider: Set(request.provider),
                    credentials_ciphertext: Set(request.credentials_ciphertext),
                    settings: Set(request.settings),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                Ok(integration.insert(self.db).await?)
            }
        }
    }

    /// List a user's integrations, oldest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<IntegrationModel>, RepositoryError> {
        Ok(Integration::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    /// Get one integration by (user, provider).
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<IntegrationModel>, RepositoryError> {
        Ok(Integration::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider))
            .one(self.db)
            .await?)
    }

    /// Create or replace the Twilio settings row for a user.
    pub async fn upsert_twilio(
        &self,
        request: UpsertTwilioRequest,
    ) -> Result<TwilioModel, RepositoryError> {
        if request.account_sid.trim().is_empty() {
            return Err(RepositoryError::validation("Account SID cannot be empty"));
        }

        let now = Utc::now();

        let existing = TwilioSetting::find()
            .filter(TwilioColumn::UserId.eq(request.user_id))
            .one(self.db)
            .await?;

        match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.account_sid = Set(request.account_sid.trim().to_string());
                active.auth_token_ciphertext = Set(request.auth_token_ciphertext);
                active.phone_number = Set(request.phone_number);
                active.updated_at = Set(now.into());
                Ok(active.update(self.db).await?)
            }
            None => {
                let settings = TwilioActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(request.user_id),
                    account_sid: Set(request.account_sid.trim().to_string()),
                    auth_token_ciphertext: Set(request.auth_token_ciphertext),
                    phone_number: Set(request.phone_number),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                Ok(settings.insert(self.db).await?)
            }
        }
    }

    /// Get a user's Twilio settings.
    pub async fn find_twilio_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TwilioModel>, RepositoryError> {
        Ok(TwilioSetting::find()
            .filter(TwilioColumn::UserId.eq(user_id))
            .one(self.db)
            .await?)
    }
}
