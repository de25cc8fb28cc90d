//! # Lead Repository
//!
//! CRUD and visibility-scoped queries for leads. List queries apply the
//! [`LeadScope`] derived from the policy module directly in SQL; point reads
//! resolve the owning user so handlers can evaluate the access predicate.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    JoinType, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::RepositoryError;
use crate::authz::LeadScope;
use crate::models::lead::{
    ActiveModel as LeadActiveModel, Column, Entity as Lead, LeadSource, LeadStatus,
    Model as LeadModel, Relation,
};
use crate::models::user::{Column as UserColumn, Entity as User, Model as UserModel};

/// Request data for creating a new lead
#[derive(Debug, Clone)]
pub struct CreateLeadRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
    pub source: LeadSource,
    pub owner_user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub utm: Option<JsonValue>,
    pub raw_payload: Option<JsonValue>,
}

/// Partial update of a lead; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateLeadRequest {
    pub full_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub language: Option<Option<String>>,
    pub status: Option<LeadStatus>,
    pub owner_user_id: Option<Option<Uuid>>,
    pub team_id: Option<Option<Uuid>>,
    pub campaign_id: Option<Option<Uuid>>,
}

/// Repository for Lead database operations
pub struct LeadRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LeadRepository<'a> {
    /// Create a new LeadRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new lead. A lead must carry at least one contact channel.
    pub async fn create(&self, request: CreateLeadRequest) -> Result<LeadModel, RepositoryError> {
        if request.full_name.trim().is_empty() {
            return Err(RepositoryError::validation("Lead full name cannot be empty"));
        }

        let phone = request.phone.filter(|p| !p.trim().is_empty());
        let email = request.email.filter(|e| !e.trim().is_empty());
        if phone.is_none() && email.is_none() {
            return Err(RepositoryError::validation(
                "Lead must have at least a phone or an email",
            ));
        }

        let now = Utc::now();
        let lead = LeadActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(phone),
            email: Set(email),
            country: Set(request.country),
            city: Set(request.city),
            language: Set(request.language),
            source: Set(request.source),
            status: Set(LeadStatus::New),
            owner_user_id: Set(request.owner_user_id),
            team_id: Set(request.team_id),
            campaign_id: Set(request.campaign_id),
            utm: Set(request.utm),
            raw_payload: Set(request.raw_payload),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(lead.insert(self.db).await?)
    }

    /// Get a lead by ID
    pub async fn find_by_id(&self, lead_id: Uuid) -> Result<Option<LeadModel>, RepositoryError> {
        Ok(Lead::find_by_id(lead_id).one(self.db).await?)
    }

    /// Get a lead together with its owning user, when one exists.
    pub async fn find_with_owner(
        &self,
        lead_id: Uuid,
    ) -> Result<Option<(LeadModel, Option<UserModel>)>, RepositoryError> {
        Ok(Lead::find_by_id(lead_id)
            .find_also_related(User)
            .one(self.db)
            .await?)
    }

    /// List leads visible under the given scope, newest first.
    pub async fn list(&self, scope: LeadScope) -> Result<Vec<LeadModel>, RepositoryError> {
        let query = Lead::find().order_by_desc(Column::CreatedAt);

        let query = match scope {
            LeadScope::All => query,
            LeadScope::OwnedBy(user_id) => query.filter(Column::OwnerUserId.eq(user_id)),
            LeadScope::TeamOrUnowned(team_id) => query
                .join(JoinType::LeftJoin, Relation::Owner.def())
                .filter(
                    Condition::any()
                        .add(Column::OwnerUserId.is_null())
                        .add(UserColumn::TeamId.eq(team_id)),
                ),
            LeadScope::Nothing => return Ok(Vec::new()),
        };

        Ok(query.all(self.db).await?)
    }

    /// Apply a partial update to a lead.
    pub async fn update(
        &self,
        lead: LeadModel,
        request: UpdateLeadRequest,
    ) -> Result<LeadModel, RepositoryError> {
        let mut active = lead.into_active_model();

        if let Some(full_name) = request.full_name {
            if full_name.trim().is_empty() {
                return Err(RepositoryError::validation("Lead full name cannot be empty"));
            }
            active.full_name = Set(full_name.trim().to_string());
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone.filter(|p| !p.trim().is_empty()));
        }
        if let Some(email) = request.email {
            active.email = Set(email.filter(|e| !e.trim().is_empty()));
        }
        if let Some(country) = request.country {
            active.country = Set(country);
        }
        if let Some(city) = request.city {
            active.city = Set(city);
        }
        if let Some(language) = request.language {
            active.language = Set(language);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(owner_user_id) = request.owner_user_id {
            active.owner_user_id = Set(owner_user_id);
        }
        if let Some(team_id) = request.team_id {
            active.team_id = Set(team_id);
        }
        if let Some(campaign_id) = request.campaign_id {
            active.campaign_id = Set(campaign_id);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(self.db).await?)
    }

    /// Delete a lead (notes and deals cascade).
    pub async fn delete(&self, lead: LeadModel) -> Result<(), RepositoryError> {
        lead.delete(self.db).await?;
        Ok(())
    }

    /// Find an existing lead matching the given phone or email. Used by CSV
    /// ingestion for duplicate detection; duplicates are reported, not
    /// skipped.
    pub async fn find_duplicate(
        &self,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<LeadModel>, RepositoryError> {
        let mut condition = Condition::any();
        if let Some(phone) = phone.filter(|p| !p.is_empty()) {
            condition = condition.add(Column::Phone.eq(phone));
        }
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            condition = condition.add(Column::Email.eq(email));
        }

        if condition.is_empty() {
            return Ok(None);
        }

        Ok(Lead::find()
            .filter(condition)
            .limit(1)
            .one(self.db)
            .await?)
    }
}
