//! Account balance calculations.
//!
//! A balance is never stored. It is always derived from entry history as
//! `sum(credits) - sum(debits)`.

use creditline_shared::types::AccountId;
use serde::{Deserialize, Serialize};

use super::credit::source;
use super::entry::{EntryType, LedgerEntry};

/// Credit and debit totals for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Sum of all credit amounts.
    pub credit_total: i64,
    /// Sum of all debit amounts.
    pub debit_total: i64,
}

impl AccountBalance {
    /// Creates an empty balance.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self::from_totals(account_id, 0, 0)
    }

    /// Creates a balance from precomputed totals.
    #[must_use]
    pub fn from_totals(account_id: AccountId, credit_total: i64, debit_total: i64) -> Self {
        Self {
            account_id,
            credit_total,
            debit_total,
        }
    }

    /// Folds the entries belonging to `account_id`; entries for other accounts are skipped.
    #[must_use]
    pub fn from_entries<'a>(
        account_id: AccountId,
        entries: impl IntoIterator<Item = &'a LedgerEntry>,
    ) -> Self {
        let mut balance = Self::new(account_id);
        for entry in entries {
            balance.apply(entry);
        }
        balance
    }

    /// Adds one entry to the totals if it belongs to this account.
    pub fn apply(&mut self, entry: &LedgerEntry) {
        if entry.account_id != self.account_id {
            return;
        }
        match entry.entry_type {
            EntryType::Credit => self.credit_total += entry.amount,
            EntryType::Debit => self.debit_total += entry.amount,
        }
    }

    /// Net balance: credits minus debits.
    #[must_use]
    pub fn balance(&self) -> i64 {
        self.credit_total - self.debit_total
    }
}

/// Sums every debit, minus credits that revert an earlier debit.
///
/// Credits whose source contains [`source::SYSTEM_REVERT`] give usage back,
/// so they are subtracted from the total.
#[must_use]
pub fn total_debited<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> i64 {
    entries.into_iter().fold(0, |total, entry| match entry.entry_type {
        EntryType::Debit => total + entry.amount,
        EntryType::Credit if entry.source.contains(source::SYSTEM_REVERT) => total - entry.amount,
        EntryType::Credit => total,
    })
}
