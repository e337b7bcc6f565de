//! Billing accounts migration.
//!
//! Creates the table backing the account directory: one row per customer
//! account with its credit floor.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillingAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BillingAccounts::Name)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    // Negative = overdraft allowance, positive = minimum reserve
                    .col(
                        ColumnDef::new(BillingAccounts::CreditMin)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillingAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BillingAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillingAccounts::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BillingAccounts {
    Table,
    Id,
    Name,
    CreditMin,
    CreatedAt,
    UpdatedAt,
}
