//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod balance;
pub mod entry;
pub mod ledger;

pub use account::{AccountDirectory, AccountError, AccountRepository, CreateAccountInput};
pub use balance::BalanceCalculator;
pub use entry::{EntryColumn, EntryStoreError, LedgerEntryRepository};
pub use ledger::LedgerRepository;

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr};

/// Repository errors that can report an elapsed statement bound.
pub(crate) trait StatementError: From<DbErr> {
    fn timed_out(operation: &'static str) -> Self;
}

/// Runs one database statement, failing with `timed_out(operation)` once `limit` elapses.
///
/// The in-flight future is dropped on expiry; a transaction it was running in
/// rolls back when dropped.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    operation: &'static str,
    statement: F,
) -> Result<T, E>
where
    E: StatementError,
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(limit, statement).await {
        Ok(result) => result.map_err(E::from),
        Err(_) => Err(E::timed_out(operation)),
    }
}

/// Returns true for serialization failures (`40001`), deadlocks (`40P01`)
/// and SQLite lock contention (`SQLITE_BUSY`, `SQLITE_LOCKED`).
pub(crate) fn is_serialization_failure(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return false,
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => {
            db_err.code().is_some_and(|code| is_conflict_code(&code))
        }
        _ => false,
    }
}

/// `PostgreSQL` SQLSTATEs are five characters. SQLite reports numeric
/// extended result codes whose low byte is the primary code.
fn is_conflict_code(code: &str) -> bool {
    if code.len() == 5 {
        return matches!(code, "40001" | "40P01");
    }
    code.parse::<i32>()
        .is_ok_and(|extended| matches!(extended & 0xff, 5 | 6))
}
