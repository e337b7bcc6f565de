//! Credit add/deduct preparation.
//!
//! Adding credits moves an amount from the platform account to a customer;
//! deducting moves it back. Both are expressed as an [`EntryPair`] which the
//! ledger writer persists atomically.

use creditline_shared::types::{AccountId, LedgerEntryId, UserId};

use super::entry::{EntryPair, Metadata, NewLedgerEntry};
use super::error::LedgerError;

/// Well-known entry source tags.
pub mod source {
    /// Default source when the caller gives none.
    pub const SYSTEM: &str = "system";
    /// Starter credits granted when an account is created.
    pub const SYSTEM_STARTER: &str = "system.starter";
    /// Credits awarded by a platform event.
    pub const SYSTEM_AWARDED: &str = "system.awarded";
    /// Credits returned to revert an earlier debit.
    pub const SYSTEM_REVERT: &str = "system.revert";
    /// Credits granted to settle an overdraft.
    pub const SYSTEM_OVERDRAFT: &str = "system.overdraft";
}

/// A request to move credits between a customer account and the platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credit {
    /// Idempotency key for the movement.
    pub id: Option<LedgerEntryId>,
    /// The customer account.
    pub account_id: AccountId,
    /// Amount in minor units.
    pub amount: i64,
    /// Origin tag; defaults to [`source::SYSTEM`].
    pub source: String,
    /// Human-readable note.
    pub description: String,
    /// Actor attribution.
    pub user_id: Option<UserId>,
    /// Opaque payload copied to both entries.
    pub metadata: Option<Metadata>,
}

/// Builds entry pairs for credit operations.
pub struct CreditService;

impl CreditService {
    /// Prepares the pair for adding credits: the platform is debited and the customer credited.
    ///
    /// The caller's ID goes on the credit side.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntryId` or `NegativeAmount` on invalid input.
    pub fn prepare_add(credit: &Credit) -> Result<EntryPair, LedgerError> {
        let id = Self::validate(credit)?;

        let debit = Self::side(credit, AccountId::PLATFORM);
        let credit_side = Self::side(credit, credit.account_id).with_id(id);
        Ok(EntryPair::new(debit, credit_side))
    }

    /// Prepares the pair for deducting credits: the customer is debited and the platform credited.
    ///
    /// The caller's ID goes on the debit side, making it the idempotency key.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntryId` or `NegativeAmount` on invalid input.
    pub fn prepare_deduct(credit: &Credit) -> Result<EntryPair, LedgerError> {
        let id = Self::validate(credit)?;

        let debit = Self::side(credit, credit.account_id).with_id(id);
        let credit_side = Self::side(credit, AccountId::PLATFORM);
        Ok(EntryPair::new(debit, credit_side))
    }

    fn validate(credit: &Credit) -> Result<LedgerEntryId, LedgerError> {
        let id = credit.id.ok_or(LedgerError::MissingEntryId)?;
        if credit.amount < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(id)
    }

    fn side(credit: &Credit, account_id: AccountId) -> NewLedgerEntry {
        let source = if credit.source.is_empty() {
            source::SYSTEM
        } else {
            credit.source.as_str()
        };

        NewLedgerEntry {
            id: None,
            account_id,
            amount: credit.amount,
            source: source.to_string(),
            description: credit.description.clone(),
            user_id: credit.user_id,
            metadata: credit.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_credit(amount: i64) -> Credit {
        Credit {
            id: Some(LedgerEntryId::new()),
            account_id: AccountId::new(),
            amount,
            description: "monthly top-up".to_string(),
            ..Credit::default()
        }
    }

    #[test]
    fn test_prepare_add() {
        let credit = make_credit(250);
        let pair = CreditService::prepare_add(&credit).unwrap();

        assert_eq!(pair.debit.account_id, AccountId::PLATFORM);
        assert_eq!(pair.debit.id, None);
        assert_eq!(pair.credit.account_id, credit.account_id);
        assert_eq!(pair.credit.id, credit.id);
        assert_eq!(pair.debit.amount, 250);
        assert_eq!(pair.credit.amount, 250);
        assert!(!pair.debits_customer());
    }

    #[test]
    fn test_prepare_deduct() {
        let credit = make_credit(80);
        let pair = CreditService::prepare_deduct(&credit).unwrap();

        assert_eq!(pair.debit.account_id, credit.account_id);
        assert_eq!(pair.debit.id, credit.id);
        assert_eq!(pair.credit.account_id, AccountId::PLATFORM);
        assert_eq!(pair.credit.id, None);
        assert!(pair.debits_customer());
    }

    #[test]
    fn test_source_defaults_to_system() {
        let pair = CreditService::prepare_deduct(&make_credit(1)).unwrap();
        assert_eq!(pair.debit.source, source::SYSTEM);
        assert_eq!(pair.credit.source, source::SYSTEM);
    }

    #[test]
    fn test_explicit_source_is_kept() {
        let mut credit = make_credit(1);
        credit.source = source::SYSTEM_AWARDED.to_string();
        let pair = CreditService::prepare_add(&credit).unwrap();
        assert_eq!(pair.credit.source, source::SYSTEM_AWARDED);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let mut credit = make_credit(10);
        credit.id = None;
        assert!(matches!(
            CreditService::prepare_add(&credit),
            Err(LedgerError::MissingEntryId)
        ));
        assert!(matches!(
            CreditService::prepare_deduct(&credit),
            Err(LedgerError::MissingEntryId)
        ));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        assert!(matches!(
            CreditService::prepare_deduct(&make_credit(-1)),
            Err(LedgerError::NegativeAmount)
        ));
    }
}
