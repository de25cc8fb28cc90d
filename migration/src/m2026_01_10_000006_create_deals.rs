//! Migration to create the deals table.
//!
//! A deal references a lead, a pipeline and a stage within that pipeline.
//! Amounts are integer cents. The open/won/lost state is derived from the
//! `won` flag and `lost_reason` column, never stored separately.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Deals::LeadId).uuid().not_null())
                    .col(ColumnDef::new(Deals::PipelineId).uuid().not_null())
                    .col(ColumnDef::new(Deals::StageId).uuid().not_null())
                    .col(ColumnDef::new(Deals::Title).text().not_null())
                    .col(ColumnDef::new(Deals::AmountCents).big_integer().null())
                    .col(ColumnDef::new(Deals::Currency).text().null())
                    .col(
                        ColumnDef::new(Deals::Won)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Deals::LostReason).text().null())
                    .col(ColumnDef::new(Deals::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Deals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Deals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_lead_id")
                            .from(Deals::Table, Deals::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_pipeline_id")
                            .from(Deals::Table, Deals::PipelineId)
                            .to(Pipelines::Table, Pipelines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_stage_id")
                            .from(Deals::Table, Deals::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deals_created_by")
                            .from(Deals::Table, Deals::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deals_lead_id")
                    .table(Deals::Table)
                    .col(Deals::LeadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deals_pipeline_stage")
                    .table(Deals::Table)
                    .col(Deals::PipelineId)
                    .col(Deals::StageId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_deals_lead_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_deals_pipeline_stage").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    LeadId,
    PipelineId,
    StageId,
    Title,
    AmountCents,
    Currency,
    Won,
    LostReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Pipelines {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Stages {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
