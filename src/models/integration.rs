//! Integration entity model
//!
//! Per-user ad-platform credentials. Secrets are stored as AES-256-GCM
//! ciphertext produced by the crypto module; one row per (user, provider).

use super::user::Entity as User;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Integration entity holding encrypted per-user provider credentials
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    /// Unique identifier for the integration (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Ad platform the credentials belong to (stored as text)
    pub provider: Provider,

    /// Encrypted credential payload
    pub credentials_ciphertext: Vec<u8>,

    /// Non-secret provider settings (page ids, form ids, site URL)
    #[sea_orm(column_type = "JsonBinary")]
    pub settings: Option<JsonValue>,

    /// Timestamp when the integration was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the integration was last updated
    pub updated_at: DateTimeWithTimeZone,
}

/// Supported ad platforms
#[derive(
    Copy,
    Clone,
    Debug,
    EnumIter,
    DeriveActiveEnum,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[sea_orm(string_value = "meta")]
    Meta,
    #[sea_orm(string_value = "tiktok")]
    Tiktok,
    #[sea_orm(string_value = "wordpress")]
    Wordpress,
}

impl Provider {
    /// Parse a URL path segment into a provider slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "meta" => Some(Provider::Meta),
            "tiktok" => Some(Provider::Tiktok),
            "wordpress" => Some(Provider::Wordpress),
            _ => None,
        }
    }

    pub fn as_slug(self) -> &'static str {
        match self {
            Provider::Meta => "meta",
            Provider::Tiktok => "tiktok",
            Provider::Wordpress => "wordpress",
        }
    }
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
