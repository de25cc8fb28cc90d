//! # Lead Note Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::lead_note::{
    ActiveModel as NoteActiveModel, Column, Entity as LeadNote, Model as NoteModel,
};

/// Repository for LeadNote database operations
pub struct LeadNoteRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LeadNoteRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a note on a lead. The body must be non-empty after trimming.
    pub async fn create(
        &self,
        lead_id: Uuid,
        user_id: Uuid,
        body: &str,
    ) -> Result<NoteModel, RepositoryError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(RepositoryError::validation("Note body cannot be empty"));
        }

        let note = NoteActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(lead_id),
            user_id: Set(user_id),
            body: Set(body.to_string()),
            created_at: Set(Utc::now().into()),
        };

        Ok(note.insert(self.db).await?)
    }

    /// List notes for a lead, newest first.
    pub async fn list_for_lead(&self, lead_id: Uuid) -> Result<Vec<NoteModel>, RepositoryError> {
        Ok(LeadNote::find()
            .filter(Column::LeadId.eq(lead_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await?)
    }
}
