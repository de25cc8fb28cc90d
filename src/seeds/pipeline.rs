//! Pipeline seeding functionality
//!
//! Seeds the default sales pipeline with its stage ladder so deals can be
//! created on a fresh install without manual setup.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::repositories::{CreatePipelineRequest, PipelineRepository};

/// Stage ladder of the default pipeline, in display order.
const DEFAULT_STAGES: &[&str] = &[
    "New",
    "Contacted",
    "Qualified",
    "Proposal",
    "Negotiation",
    "Closed",
];

/// Seeds the default pipeline if no pipeline exists yet. Idempotent: an
/// instance with any pipeline is left untouched.
pub async fn seed_default_pipeline(db: &DatabaseConnection) -> Result<()> {
    let repo = PipelineRepository::new(db);

    if repo.any_exists().await? {
        log::info!("A pipeline already exists, skipping default pipeline seed");
        return Ok(());
    }

    let (pipeline, stages) = repo
        .create(CreatePipelineRequest {
            name: "Sales Pipeline".to_string(),
            stages: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
        })
        .await?;

    log::info!(
        "Seeded default pipeline '{}' with {} stages",
        pipeline.name,
        stages.len()
    );

    Ok(())
}
