//! Migration to create the leads table.
//!
//! Leads are the central entity: contact fields, an acquisition source, a
//! pipeline status, optional ownership (user/team/campaign) and the opaque
//! ingestion payload captured at intake.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Leads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Leads::FullName).text().not_null())
                    .col(ColumnDef::new(Leads::Phone).text().null())
                    .col(ColumnDef::new(Leads::Email).text().null())
                    .col(ColumnDef::new(Leads::Country).text().null())
                    .col(ColumnDef::new(Leads::City).text().null())
                    .col(ColumnDef::new(Leads::Language).text().null())
                    .col(
                        ColumnDef::new(Leads::Source)
                            .text()
                            .not_null()
                            .default("manual"),
                    )
                    .col(
                        ColumnDef::new(Leads::Status)
                            .text()
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Leads::OwnerUserId).uuid().null())
                    .col(ColumnDef::new(Leads::TeamId).uuid().null())
                    .col(ColumnDef::new(Leads::CampaignId).uuid().null())
                    .col(ColumnDef::new(Leads::Utm).json_binary().null())
                    .col(ColumnDef::new(Leads::RawPayload).json_binary().null())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Leads::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_owner_user_id")
                            .from(Leads::Table, Leads::OwnerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_team_id")
                            .from(Leads::Table, Leads::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_campaign_id")
                            .from(Leads::Table, Leads::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_owner_user_id")
                    .table(Leads::Table)
                    .col(Leads::OwnerUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_team_id")
                    .table(Leads::Table)
                    .col(Leads::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_campaign_id")
                    .table(Leads::Table)
                    .col(Leads::CampaignId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_leads_owner_user_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_leads_team_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_leads_campaign_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    FullName,
    Phone,
    Email,
    Country,
    City,
    Language,
    Source,
    Status,
    OwnerUserId,
    TeamId,
    CampaignId,
    Utm,
    RawPayload,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Id,
}
