//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and built with its
//! backend-neutral schema builder, so they run on PostgreSQL and SQLite alike.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_billing_accounts;
mod m20260301_000002_billing_transactions;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_billing_accounts::Migration),
            Box::new(m20260301_000002_billing_transactions::Migration),
        ]
    }
}
