//! # Deal Repository
//!
//! CRUD and visibility-scoped queries for deals. Visibility always flows
//! through the deal's lead; there is no separate deal ownership concept
//! besides the `created_by` column consulted on delete.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    JoinType, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::RepositoryError;
use crate::authz::LeadScope;
use crate::models::deal::{
    ActiveModel as DealActiveModel, Column, Entity as Deal, Model as DealModel, Relation,
};
use crate::models::lead::{
    Column as LeadColumn, Entity as Lead, Model as LeadModel, Relation as LeadRelation,
};
use crate::models::user::Column as UserColumn;

/// Request data for creating a new deal
#[derive(Debug, Clone)]
pub struct CreateDealRequest {
    pub lead_id: Uuid,
    pub pipeline_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub created_by: Uuid,
}

/// Partial update of a deal; `None` leaves the field untouched. No state
/// transition rules are applied: any combination of `won` and `lost_reason`
/// persists as given.
#[derive(Debug, Clone, Default)]
pub struct UpdateDealRequest {
    pub title: Option<String>,
    pub stage_id: Option<Uuid>,
    pub amount_cents: Option<Option<i64>>,
    pub currency: Option<Option<String>>,
    pub won: Option<bool>,
    pub lost_reason: Option<Option<String>>,
}

/// Repository for Deal database operations
pub struct DealRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DealRepository<'a> {
    /// Create a new DealRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a deal. Referential checks (lead exists and is accessible,
    /// stage belongs to pipeline) happen in the handler before this call.
    pub async fn create(&self, request: CreateDealRequest) -> Result<DealModel, RepositoryError> {
        if request.title.trim().is_empty() {
            return Err(RepositoryError::validation("Deal title cannot be empty"));
        }

        let now = Utc::now();
        let deal = DealActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(request.lead_id),
            pipeline_id: Set(request.pipeline_id),
            stage_id: Set(request.stage_id),
            title: Set(request.title.trim().to_string()),
            amount_cents: Set(request.amount_cents),
            currency: Set(request.currency),
            won: Set(false),
            lost_reason: Set(None),
            created_by: Set(request.created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(deal.insert(self.db).await?)
    }

    /// Get a deal by ID
    pub async fn find_by_id(&self, deal_id: Uuid) -> Result<Option<DealModel>, RepositoryError> {
        Ok(Deal::find_by_id(deal_id).one(self.db).await?)
    }

    /// Get a deal together with its lead.
    pub async fn find_with_lead(
        &self,
        deal_id: Uuid,
    ) -> Result<Option<(DealModel, Option<LeadModel>)>, RepositoryError> {
        Ok(Deal::find_by_id(deal_id)
            .find_also_related(Lead)
            .one(self.db)
            .await?)
    }

    /// List deals whose lead is visible under the given scope, newest first.
    pub async fn list(&self, scope: LeadScope) -> Result<Vec<DealModel>, RepositoryError> {
        let query = Deal::find().order_by_desc(Column::CreatedAt);

        let query = match scope {
            LeadScope::All => query,
            LeadScope::OwnedBy(user_id) => query
                .join(JoinType::InnerJoin, Relation::Lead.def())
                .filter(LeadColumn::OwnerUserId.eq(user_id)),
            LeadScope::TeamOrUnowned(team_id) => query
                .join(JoinType::InnerJoin, Relation::Lead.def())
                .join(JoinType::LeftJoin, LeadRelation::Owner.def())
                .filter(
                    Condition::any()
                        .add(LeadColumn::OwnerUserId.is_null())
                        .add(UserColumn::TeamId.eq(team_id)),
                ),
            LeadScope::Nothing => return Ok(Vec::new()),
        };

        Ok(query.all(self.db).await?)
    }

    /// Apply a partial update to a deal.
    pub async fn update(
        &self,
        deal: DealModel,
        request: UpdateDealRequest,
    ) -> Result<DealModel, RepositoryError> {
        let mut active = deal.into_active_model();

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(RepositoryError::validation("Deal title cannot be empty"));
            }
            active.title = Set(title.trim().to_string());
        }
        if let Some(stage_id) = request.stage_id {
            active.stage_id = Set(stage_id);
        }
        if let Some(amount_cents) = request.amount_cents {
            active.amount_cents = Set(amount_cents);
        }
        if let Some(currency) = request.currency {
            active.currency = Set(currency);
        }
        if let Some(won) = request.won {
            active.won = Set(won);
        }
        if let Some(lost_reason) = request.lost_reason {
            active.lost_reason = Set(lost_reason);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(self.db).await?)
    }

    /// Delete a deal. The creator-only rule for sales is enforced by the
    /// handler through the policy module before this call.
    pub async fn delete(&self, deal: DealModel) -> Result<(), RepositoryError> {
        deal.delete(self.db).await?;
        Ok(())
    }
}
