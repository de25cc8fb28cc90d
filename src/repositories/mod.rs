//! # Repositories
//!
//! Database access for each aggregate. Repositories hold a borrowed
//! connection, validate inputs before touching the database and return
//! [`RepositoryError`] so handlers can `?` straight into API responses.

use axum::http::StatusCode;
use thiserror::Error;

use crate::error::ApiError;

pub mod ad_spend;
pub mod campaign;
pub mod deal;
pub mod integration;
pub mod lead;
pub mod lead_note;
pub mod pipeline;
pub mod team;
pub mod user;

pub use ad_spend::AdSpendRepository;
pub use campaign::{CampaignRepository, CreateCampaignRequest};
pub use deal::{CreateDealRequest, DealRepository, UpdateDealRequest};
pub use integration::{IntegrationRepository, UpsertIntegrationRequest, UpsertTwilioRequest};
pub use lead::{CreateLeadRequest, LeadRepository, UpdateLeadRequest};
pub use lead_note::LeadNoteRepository;
pub use pipeline::{CreatePipelineRequest, PipelineRepository};
pub use team::TeamRepository;
pub use user::{CreateUserRequest, UserRepository};

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
}

impl RepositoryError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        RepositoryError::Validation(message.into())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            // DbErr mapping handles unique violations (409) and the rest
            RepositoryError::Database(db_err) => db_err.into(),
            RepositoryError::NotFound(entity) => crate::error::not_found(entity),
            RepositoryError::Validation(message) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED".to_string(),
                message,
            ),
        }
    }
}
