//! Balance calculator.
//!
//! Derives `credits - debits` for an account from two per-type sums. Both
//! sums run through the caller's connection, so inside a ledger transaction
//! they observe the same snapshot as the write that follows.

use creditline_core::ledger::{AccountBalance, EntryType, TimeRange};
use creditline_shared::types::AccountId;
use sea_orm::ConnectionTrait;

use super::entry::{EntryStoreError, LedgerEntryRepository};

/// Computes account balances from entry history.
#[derive(Debug, Clone)]
pub struct BalanceCalculator {
    entries: LedgerEntryRepository,
}

impl BalanceCalculator {
    /// Creates a calculator reading through `entries`.
    #[must_use]
    pub const fn new(entries: LedgerEntryRepository) -> Self {
        Self { entries }
    }

    /// Returns the account's totals as seen through `conn`.
    ///
    /// Without a range every entry counts; with one, only `start <= created_at < end`.
    pub async fn balance_in_scope<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: AccountId,
        range: Option<TimeRange>,
    ) -> Result<AccountBalance, EntryStoreError> {
        let debit_total = self
            .entries
            .sum_by_type(conn, account_id, EntryType::Debit, range)
            .await?;
        let credit_total = self
            .entries
            .sum_by_type(conn, account_id, EntryType::Credit, range)
            .await?;

        Ok(AccountBalance::from_totals(
            account_id,
            credit_total,
            debit_total,
        ))
    }
}
