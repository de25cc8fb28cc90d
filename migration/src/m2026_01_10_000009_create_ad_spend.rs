//! Migration to create the ad_spend table.
//!
//! One row per (campaign, date) spend record ingested from CSV uploads.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdSpend::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdSpend::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdSpend::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(AdSpend::SpendDate).date().not_null())
                    .col(ColumnDef::new(AdSpend::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(AdSpend::Currency).text().not_null())
                    .col(
                        ColumnDef::new(AdSpend::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ad_spend_campaign_id")
                            .from(AdSpend::Table, AdSpend::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ad_spend_campaign_date")
                    .table(AdSpend::Table)
                    .col(AdSpend::CampaignId)
                    .col(AdSpend::SpendDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ad_spend_campaign_date").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AdSpend::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdSpend {
    Table,
    Id,
    CampaignId,
    SpendDate,
    AmountCents,
    Currency,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Id,
}
