//! Migration to create the integrations and twilio_settings tables.
//!
//! Both tables hold per-user external-service credentials. Secrets are
//! stored as AES-256-GCM ciphertext, never plaintext.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Integrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Integrations::UserId).uuid().not_null())
                    .col(ColumnDef::new(Integrations::Provider).text().not_null())
                    .col(
                        ColumnDef::new(Integrations::CredentialsCiphertext)
                            .binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Integrations::Settings).json_binary().null())
                    .col(
                        ColumnDef::new(Integrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Integrations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integrations_user_id")
                            .from(Integrations::Table, Integrations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_integrations_user_provider")
                    .table(Integrations::Table)
                    .col(Integrations::UserId)
                    .col(Integrations::Provider)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TwilioSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TwilioSettings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TwilioSettings::UserId).uuid().not_null())
                    .col(ColumnDef::new(TwilioSettings::AccountSid).text().not_null())
                    .col(
                        ColumnDef::new(TwilioSettings::AuthTokenCiphertext)
                            .binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TwilioSettings::PhoneNumber).text().null())
                    .col(
                        ColumnDef::new(TwilioSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TwilioSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_twilio_settings_user_id")
                            .from(TwilioSettings::Table, TwilioSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_twilio_settings_user_id")
                    .table(TwilioSettings::Table)
                    .col(TwilioSettings::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_integrations_user_provider")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_twilio_settings_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TwilioSettings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Integrations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
    UserId,
    Provider,
    CredentialsCiphertext,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TwilioSettings {
    Table,
    Id,
    UserId,
    AccountSid,
    AuthTokenCiphertext,
    PhoneNumber,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
