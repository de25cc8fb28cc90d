//! # User Repository
//!
//! CRUD operations for users. The auth middleware resolves every request's
//! user through this repository so role and team membership are always
//! current.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::Role;
use crate::models::user::{ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel};

/// Request data for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserModel, RepositoryError> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(RepositoryError::validation("Email must be a valid address"));
        }
        if request.full_name.trim().is_empty() {
            return Err(RepositoryError::validation("Full name cannot be empty"));
        }

        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            full_name: Set(request.full_name.trim().to_string()),
            role: Set(request.role),
            team_id: Set(request.team_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(user.insert(self.db).await?)
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find_by_id(user_id).one(self.db).await?)
    }

    /// Get a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await?)
    }
}
