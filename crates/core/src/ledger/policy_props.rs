//! Property-based tests for the sufficiency policy.
//!
//! The policy must enforce the floor exactly: a permitted debit never leaves
//! the balance below the floor, and the largest permitted debit lands on it.

use proptest::prelude::*;

use super::policy::is_sufficient;

/// Strategy for floors in all three regimes (overdraft, zero, reserve).
fn floor_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), -1_000_000i64..0, 1i64..1_000_000]
}

fn balance_strategy() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000
}

fn amount_strategy() -> impl Strategy<Value = i64> {
    0i64..2_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A permitted debit never takes the balance below the floor.
    #[test]
    fn prop_permitted_debit_respects_floor(
        floor in floor_strategy(),
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        if is_sufficient(floor, balance, amount) {
            prop_assert!(balance - amount >= floor);
        }
    }

    /// A rejected debit would have taken the balance below the floor.
    #[test]
    fn prop_rejected_debit_crosses_floor(
        floor in floor_strategy(),
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        if !is_sufficient(floor, balance, amount) {
            prop_assert!(balance - amount < floor);
        }
    }

    /// Spending exactly down to the floor is permitted; one more unit is not.
    #[test]
    fn prop_boundary_is_inclusive(
        floor in floor_strategy(),
        headroom in 0i64..1_000_000,
    ) {
        let balance = floor + headroom;
        prop_assert!(is_sufficient(floor, balance, headroom));
        prop_assert!(!is_sufficient(floor, balance, headroom + 1));
    }

    /// Raising the amount never turns a rejection into a permission.
    #[test]
    fn prop_monotonic_in_amount(
        floor in floor_strategy(),
        balance in balance_strategy(),
        amount in amount_strategy(),
        extra in 0i64..1_000,
    ) {
        if !is_sufficient(floor, balance, amount) {
            prop_assert!(!is_sufficient(floor, balance, amount + extra));
        }
    }
}
