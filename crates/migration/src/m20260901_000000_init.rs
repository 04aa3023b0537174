//! Initial schema.
//!
//! - `entries`: ledger records, plus a case-folded copy of the description
//!   used by substring filters
//! - `tokens`: active session tokens

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    Description,
    DescriptionFold,
    Amount,
    Date,
    CreateTime,
}

#[derive(Iden)]
enum Tokens {
    Table,
    Token,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::Description).string().not_null())
                    .col(
                        ColumnDef::new(Entries::DescriptionFold)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Entries::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-entries-date", Entries::Date),
            ("idx-entries-create_time", Entries::CreateTime),
            ("idx-entries-amount", Entries::Amount),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Entries::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Tokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tokens::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        Ok(())
    }
}
