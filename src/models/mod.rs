//! # Data Models
//!
//! This module contains all the data models used throughout the CRM API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod ad_spend;
pub mod campaign;
pub mod deal;
pub mod integration;
pub mod lead;
pub mod lead_note;
pub mod pipeline;
pub mod stage;
pub mod team;
pub mod twilio_setting;
pub mod user;

pub use ad_spend::Entity as AdSpend;
pub use campaign::Entity as Campaign;
pub use deal::Entity as Deal;
pub use integration::Entity as Integration;
pub use lead::Entity as Lead;
pub use lead_note::Entity as LeadNote;
pub use pipeline::Entity as Pipeline;
pub use stage::Entity as Stage;
pub use team::Entity as Team;
pub use twilio_setting::Entity as TwilioSetting;
pub use user::Entity as User;

pub use integration::Provider as IntegrationProvider;
pub use lead::{LeadSource, LeadStatus};
pub use user::Role;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "crm-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
