//! Business rule validation for entry pairs.

use super::entry::EntryPair;
use super::error::LedgerError;

/// Validates a pair before any transaction is opened.
///
/// # Errors
///
/// - `MissingEntryId` if neither side carries a caller-supplied ID
/// - `NegativeAmount` if either amount is negative
/// - `UnbalancedPair` if the amounts differ
/// - `SameAccount` if both sides name the same account
pub fn validate_pair(pair: &EntryPair) -> Result<(), LedgerError> {
    if pair.debit.id.is_none() && pair.credit.id.is_none() {
        return Err(LedgerError::MissingEntryId);
    }

    if pair.debit.amount < 0 || pair.credit.amount < 0 {
        return Err(LedgerError::NegativeAmount);
    }

    if pair.debit.amount != pair.credit.amount {
        return Err(LedgerError::UnbalancedPair {
            debit: pair.debit.amount,
            credit: pair.credit.amount,
        });
    }

    if pair.debit.account_id == pair.credit.account_id {
        return Err(LedgerError::SameAccount(pair.debit.account_id));
    }

    Ok(())
}
