//! Shared fixtures for the ledger integration tests.
//!
//! Every fixture gets its own in-memory SQLite database with the real
//! migrations applied. The pool holds exactly one connection, so the
//! database lives as long as the fixture and writers are serialized.
//! Lock tests use a file-backed database so a second connection can
//! contend with the ledger.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use creditline_core::ledger::{Credit, LedgerError};
use creditline_db::migration::{Migrator, MigratorTrait};
use creditline_db::{AccountDirectory, AccountRepository, CreateAccountInput, LedgerRepository};
use creditline_shared::LedgerSettings;
use creditline_shared::types::{AccountId, LedgerEntryId};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("creditline=debug")
        .with_test_writer()
        .try_init();
}

/// Opens a fresh migrated in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    init_tracing();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A database file path unique to one test.
pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("creditline-{}.db", LedgerEntryId::new()))
}

/// Opens (creating if needed) a migrated file-backed database.
pub async fn setup_file_db(path: &Path, max_connections: u32) -> DatabaseConnection {
    init_tracing();

    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open database file");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Removes a database file and its journal siblings.
pub fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

/// A ledger wired to the table-backed account directory.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub accounts: AccountRepository,
    pub ledger: LedgerRepository,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_db(setup_db().await, LedgerSettings::default())
    }

    /// Wires the repositories over an existing database.
    pub fn with_db(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        let accounts = AccountRepository::new(db.clone());
        let ledger =
            LedgerRepository::with_settings(db.clone(), Arc::new(accounts.clone()), settings);
        Self {
            db,
            accounts,
            ledger,
        }
    }

    /// Creates an account with the given floor.
    pub async fn account(&self, credit_min: i64) -> AccountId {
        let created = self
            .accounts
            .create(CreateAccountInput {
                name: "Test Account".to_string(),
                credit_min,
                ..CreateAccountInput::default()
            })
            .await
            .expect("Failed to create account");
        AccountId::from_uuid(created.id)
    }

    /// Credits `amount` from the platform account.
    pub async fn fund(&self, account_id: AccountId, amount: i64) {
        self.ledger
            .add_credits(&credit(account_id, amount))
            .await
            .expect("Failed to fund account");
    }

    /// Debits `amount` to the platform account.
    pub async fn spend(&self, account_id: AccountId, amount: i64) -> Result<(), LedgerError> {
        self.ledger
            .deduct_credits(&credit(account_id, amount))
            .await
            .map(|_| ())
    }
}

/// A credit movement with a fresh idempotency key.
pub fn credit(account_id: AccountId, amount: i64) -> Credit {
    Credit {
        id: Some(LedgerEntryId::new()),
        account_id,
        amount,
        description: "integration test".to_string(),
        ..Credit::default()
    }
}

/// Directory with fixed floors that counts lookups.
#[derive(Default)]
pub struct CountingDirectory {
    pub floor: i64,
    pub lookups: AtomicUsize,
}

impl CountingDirectory {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountDirectory for CountingDirectory {
    async fn get_account_floor(&self, _account_id: AccountId) -> Result<i64, LedgerError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.floor)
    }
}
