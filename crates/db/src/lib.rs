//! Database layer for the credit ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for `billing_accounts` and `billing_transactions`
//! - Schema migrations
//! - The entry store, balance calculator, account directory and ledger writer

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountDirectory, AccountError, AccountRepository, BalanceCalculator, CreateAccountInput,
    EntryColumn, EntryStoreError, LedgerEntryRepository, LedgerRepository,
};

use creditline_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}
