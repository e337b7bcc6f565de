//! Sufficiency policy for debits against a credit floor.
//!
//! An account's floor is the minimum balance it may reach:
//! - `floor == 0`: the balance must never go negative
//! - `floor > 0`: the balance must stay at or above that reserve
//! - `floor < 0`: the balance may go negative down to the floor (overdraft)
//!
//! Both boundaries are inclusive.

use creditline_shared::types::AccountId;

use super::error::LedgerError;

/// Decides whether debiting `amount` is permitted given `floor` and `current_balance`.
///
/// Arithmetic is widened to `i128`, so extreme inputs cannot overflow.
#[must_use]
pub fn is_sufficient(floor: i64, current_balance: i64, amount: i64) -> bool {
    let floor = i128::from(floor);
    let balance = i128::from(current_balance);
    let amount = i128::from(amount);

    if floor < 0 {
        balance - floor >= amount
    } else {
        balance >= amount + floor
    }
}

/// Applies [`is_sufficient`] and reports a rejection as [`LedgerError::InsufficientCredits`].
///
/// # Errors
///
/// Returns `InsufficientCredits` when the debit would cross the floor.
pub fn check_sufficiency(
    account_id: AccountId,
    floor: i64,
    current_balance: i64,
    amount: i64,
) -> Result<(), LedgerError> {
    if is_sufficient(floor, current_balance, amount) {
        Ok(())
    } else {
        Err(LedgerError::InsufficientCredits {
            account_id,
            balance: current_balance,
            amount,
            floor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // zero floor
    #[case(0, 100, 100, true)]
    #[case(0, 100, 101, false)]
    #[case(0, 0, 0, true)]
    #[case(0, -10, 0, false)]
    // overdraft allowance
    #[case(-50, 0, 50, true)]
    #[case(-50, 0, 51, false)]
    #[case(-50, -20, 30, true)]
    #[case(-50, -20, 31, false)]
    // minimum reserve
    #[case(100, 150, 50, true)]
    #[case(100, 150, 51, false)]
    #[case(100, 100, 0, true)]
    #[case(100, 99, 0, false)]
    fn test_is_sufficient(
        #[case] floor: i64,
        #[case] balance: i64,
        #[case] amount: i64,
        #[case] expected: bool,
    ) {
        assert_eq!(is_sufficient(floor, balance, amount), expected);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert!(is_sufficient(i64::MIN, 0, i64::MAX));
        assert!(!is_sufficient(i64::MAX, i64::MAX, 1));
        assert!(!is_sufficient(0, i64::MIN, i64::MAX));
    }

    #[test]
    fn test_check_sufficiency_reports_context() {
        let account_id = AccountId::new();
        let err = check_sufficiency(account_id, 0, 100, 101).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientCredits {
                account_id: id,
                balance: 100,
                amount: 101,
                floor: 0,
            } if id == account_id
        ));
        assert!(check_sufficiency(account_id, 0, 100, 100).is_ok());
    }
}
