//! Migration to create the lead_notes table.
//!
//! Notes are free-text annotations attributed to a user and cascade-deleted
//! with their lead.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeadNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadNotes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeadNotes::LeadId).uuid().not_null())
                    .col(ColumnDef::new(LeadNotes::UserId).uuid().not_null())
                    .col(ColumnDef::new(LeadNotes::Body).text().not_null())
                    .col(
                        ColumnDef::new(LeadNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_notes_lead_id")
                            .from(LeadNotes::Table, LeadNotes::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_notes_user_id")
                            .from(LeadNotes::Table, LeadNotes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_notes_lead_id")
                    .table(LeadNotes::Table)
                    .col(LeadNotes::LeadId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_lead_notes_lead_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LeadNotes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LeadNotes {
    Table,
    Id,
    LeadId,
    UserId,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
