//! # Team Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::team::{ActiveModel as TeamActiveModel, Entity as Team, Model as TeamModel};

/// Repository for Team database operations
pub struct TeamRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeamRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new team
    pub async fn create(&self, name: &str) -> Result<TeamModel, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation("Team name cannot be empty"));
        }

        let team = TeamActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };

        Ok(team.insert(self.db).await?)
    }

    /// Get a team by ID
    pub async fn find_by_id(&self, team_id: Uuid) -> Result<Option<TeamModel>, RepositoryError> {
        Ok(Team::find_by_id(team_id).one(self.db).await?)
    }
}
