//! Migration to create the pipelines and stages tables.
//!
//! A stage always belongs to exactly one pipeline and is deleted with it.
//! Stage order within a pipeline is the `position` column.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pipelines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pipelines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pipelines::Name).text().not_null())
                    .col(
                        ColumnDef::new(Pipelines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stages::PipelineId).uuid().not_null())
                    .col(ColumnDef::new(Stages::Name).text().not_null())
                    .col(ColumnDef::new(Stages::Position).integer().not_null())
                    .col(
                        ColumnDef::new(Stages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stages_pipeline_id")
                            .from(Stages::Table, Stages::PipelineId)
                            .to(Pipelines::Table, Pipelines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stages_pipeline_position")
                    .table(Stages::Table)
                    .col(Stages::PipelineId)
                    .col(Stages::Position)
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
                    .name("idx_stages_pipeline_position")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Stages::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Pipelines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pipelines {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Stages {
    Table,
    Id,
    PipelineId,
    Name,
    Position,
    CreatedAt,
}
