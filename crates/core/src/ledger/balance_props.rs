//! Property-based tests for balance derivation.

use chrono::Utc;
use creditline_shared::types::{AccountId, LedgerEntryId};
use proptest::prelude::*;

use super::balance::AccountBalance;
use super::entry::{EntryType, LedgerEntry, Metadata};

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn movements_strategy(max_len: usize) -> impl Strategy<Value = Vec<(EntryType, i64)>> {
    prop::collection::vec((entry_type_strategy(), 0i64..1_000_000), 0..=max_len)
}

fn make_entry(account_id: AccountId, entry_type: EntryType, amount: i64) -> LedgerEntry {
    let now = Utc::now();
    LedgerEntry {
        id: LedgerEntryId::new(),
        account_id,
        amount,
        entry_type,
        source: "system".to_string(),
        description: String::new(),
        user_id: None,
        metadata: Metadata::new(),
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The folded balance equals the sum of signed entry amounts.
    #[test]
    fn prop_balance_equals_signed_sum(movements in movements_strategy(30)) {
        let account_id = AccountId::new();
        let entries: Vec<_> = movements
            .iter()
            .map(|(entry_type, amount)| make_entry(account_id, *entry_type, *amount))
            .collect();

        let expected: i64 = entries.iter().map(LedgerEntry::signed_amount).sum();
        prop_assert_eq!(AccountBalance::from_entries(account_id, &entries).balance(), expected);
    }

    /// Entry order does not change the balance.
    #[test]
    fn prop_balance_is_order_independent(movements in movements_strategy(30)) {
        let account_id = AccountId::new();
        let mut entries: Vec<_> = movements
            .iter()
            .map(|(entry_type, amount)| make_entry(account_id, *entry_type, *amount))
            .collect();

        let forward = AccountBalance::from_entries(account_id, &entries);
        entries.reverse();
        let backward = AccountBalance::from_entries(account_id, &entries);
        prop_assert_eq!(forward, backward);
    }

    /// A matched pair leaves the sum of both accounts' balances unchanged.
    #[test]
    fn prop_pairs_conserve_total(amounts in prop::collection::vec(0i64..1_000_000, 0..20)) {
        let customer = AccountId::new();
        let entries: Vec<_> = amounts
            .iter()
            .flat_map(|amount| {
                [
                    make_entry(AccountId::PLATFORM, EntryType::Debit, *amount),
                    make_entry(customer, EntryType::Credit, *amount),
                ]
            })
            .collect();

        let platform = AccountBalance::from_entries(AccountId::PLATFORM, &entries).balance();
        let customer = AccountBalance::from_entries(customer, &entries).balance();
        prop_assert_eq!(platform + customer, 0);
    }
}
