//! Ledger error types for validation, policy, and storage errors.
//!
//! This module defines all errors that can occur during ledger operations:
//! pair validation, account lookup, the sufficiency policy, idempotent
//! replays, entry lookups, and storage failures.

use creditline_shared::AppError;
use creditline_shared::types::{AccountId, LedgerEntryId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Neither side of the pair carries a caller-supplied ID.
    #[error("Entry id is empty, it is required to create a transaction")]
    MissingEntryId,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Debit and credit amounts differ.
    #[error("Entry pair is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedPair {
        /// Debit side amount.
        debit: i64,
        /// Credit side amount.
        credit: i64,
    },

    /// Both sides of the pair name the same account.
    #[error("Entry pair debits and credits the same account {0}")]
    SameAccount(AccountId),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    // ========== Policy Errors ==========
    /// The debit would take the account below its credit floor.
    #[error("Insufficient credits on account {account_id}: balance {balance}, debit {amount}, floor {floor}")]
    InsufficientCredits {
        /// The debited account.
        account_id: AccountId,
        /// Balance observed inside the write transaction.
        balance: i64,
        /// Requested debit amount.
        amount: i64,
        /// The account's configured floor.
        floor: i64,
    },

    // ========== Idempotency ==========
    /// An entry with this ID already exists; nothing was re-applied.
    #[error("Transaction already applied: {0}")]
    AlreadyApplied(LedgerEntryId),

    // ========== Lookup Errors ==========
    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(LedgerEntryId),

    // ========== Concurrency Errors ==========
    /// Serialization failure or deadlock persisted through every retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// A statement exceeded its time bound.
    #[error("Operation {operation} timed out")]
    Timeout {
        /// The timed-out operation.
        operation: &'static str,
    },

    // ========== Storage Errors ==========
    /// Any other persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingEntryId => "MISSING_ENTRY_ID",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::UnbalancedPair { .. } => "UNBALANCED_PAIR",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            Self::AlreadyApplied(_) => "ALREADY_APPLIED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::MissingEntryId
            | Self::NegativeAmount
            | Self::UnbalancedPair { .. }
            | Self::SameAccount(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict - replays and concurrency
            Self::AlreadyApplied(_) | Self::ConcurrentModification => 409,

            // 422 Unprocessable - balance policy
            Self::InsufficientCredits { .. } => 422,

            // 503 - transient
            Self::Timeout { .. } => 503,

            // 500 Internal Server Error
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification | Self::Timeout { .. })
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::MissingEntryId
            | LedgerError::NegativeAmount
            | LedgerError::UnbalancedPair { .. }
            | LedgerError::SameAccount(_) => Self::Validation(message),
            LedgerError::AccountNotFound(_) | LedgerError::EntryNotFound(_) => {
                Self::NotFound(message)
            }
            LedgerError::InsufficientCredits { .. } => Self::BusinessRule(message),
            LedgerError::AlreadyApplied(_) => Self::Conflict(message),
            LedgerError::ConcurrentModification | LedgerError::Timeout { .. } => {
                Self::Unavailable(message)
            }
            LedgerError::Storage(_) => Self::Database(message),
        }
    }
}
