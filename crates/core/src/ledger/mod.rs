//! Double-entry credit ledger logic.
//!
//! This module implements the pure side of the credit ledger:
//! - Ledger entries (debits and credits) and their inputs
//! - Balance folding over entry history
//! - The sufficiency policy enforcing per-account credit floors
//! - Pair validation before anything is persisted
//! - Credit add/deduct preparation
//! - Error types for ledger operations

pub mod balance;
pub mod credit;
pub mod entry;
pub mod error;
pub mod policy;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod policy_props;

pub use balance::{AccountBalance, total_debited};
pub use credit::{Credit, CreditService, source};
pub use entry::{
    EntryFilter, EntryPair, EntryType, LedgerEntry, Metadata, NewLedgerEntry, TimeRange,
    UnknownEntryType,
};
pub use error::LedgerError;
pub use policy::{check_sufficiency, is_sufficient};
pub use validation::validate_pair;
