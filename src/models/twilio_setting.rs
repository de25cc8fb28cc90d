//! Twilio settings entity model
//!
//! One row per user: account SID, encrypted auth token, optional sending
//! phone number.

use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Per-user Twilio credentials
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "twilio_settings")]
pub struct Model {
    /// Unique identifier (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user (unique)
    pub user_id: Uuid,

    /// Twilio account SID
    pub account_sid: String,

    /// Encrypted auth token
    pub auth_token_ciphertext: Vec<u8>,

    /// Sending phone number in E.164 form (optional)
    pub phone_number: Option<String>,

    /// Timestamp when the settings were created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the settings were last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
