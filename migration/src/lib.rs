//! Database migrations for the CRM API.
//!
//! This module contains all database migrations using SeaORM Migration.
//! The tables defined here are the authoritative schema for the service.

pub use sea_orm_migration::prelude::*;

mod m2026_01_10_000001_create_teams;
mod m2026_01_10_000002_create_users;
mod m2026_01_10_000003_create_campaigns;
mod m2026_01_10_000004_create_pipelines;
mod m2026_01_10_000005_create_leads;
mod m2026_01_10_000006_create_deals;
mod m2026_01_10_000007_create_lead_notes;
mod m2026_01_10_000008_create_integrations;
mod m2026_01_10_000009_create_ad_spend;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_01_10_000001_create_teams::Migration),
            Box::new(m2026_01_10_000002_create_users::Migration),
            Box::new(m2026_01_10_000003_create_campaigns::Migration),
            Box::new(m2026_01_10_000004_create_pipelines::Migration),
            Box::new(m2026_01_10_000005_create_leads::Migration),
            Box::new(m2026_01_10_000006_create_deals::Migration),
            Box::new(m2026_01_10_000007_create_lead_notes::Migration),
            Box::new(m2026_01_10_000008_create_integrations::Migration),
            Box::new(m2026_01_10_000009_create_ad_spend::Migration),
        ]
    }
}
