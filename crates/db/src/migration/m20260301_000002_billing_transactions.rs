//! Billing transactions migration.
//!
//! Creates the append-only entry table. The primary key on `id` is the
//! idempotency guard: replaying a caller-supplied ID violates it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillingTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::Amount)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(BillingTransactions::Amount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::Type)
                            .string()
                            .not_null()
                            .check(Expr::col(BillingTransactions::Type).is_in(["debit", "credit"])),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::Source)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(BillingTransactions::UserId).uuid().null())
                    .col(ColumnDef::new(BillingTransactions::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(BillingTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BillingTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Balance sums filter on (account_id, type)
        manager
            .create_index(
                Index::create()
                    .name("idx_billing_transactions_account_type")
                    .table(BillingTransactions::Table)
                    .col(BillingTransactions::AccountId)
                    .col(BillingTransactions::Type)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_billing_transactions_created_at")
                    .table(BillingTransactions::Table)
                    .col(BillingTransactions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(BillingTransactions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum BillingTransactions {
    Table,
    Id,
    AccountId,
    Amount,
    Type,
    Source,
    Description,
    UserId,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
