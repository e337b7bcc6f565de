//! Ledger entry domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use creditline_shared::types::{AccountId, LedgerEntryId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque key-value payload attached to an entry. Never interpreted by the ledger.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Type of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (decreases the account's balance).
    Debit,
    /// Credit entry (increases the account's balance).
    Credit,
}

impl EntryType {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored entry type is neither `debit` nor `credit`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown entry type: {0}")]
pub struct UnknownEntryType(pub String);

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(UnknownEntryType(other.to_string())),
        }
    }
}

/// A stored ledger entry: one side of a credit movement.
///
/// Entries are immutable after creation apart from `metadata` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier, also the idempotency key.
    pub id: LedgerEntryId,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Origin tag, e.g. which business process created the entry.
    pub source: String,
    /// Human-readable note.
    pub description: String,
    /// Actor attribution.
    pub user_id: Option<UserId>,
    /// Opaque payload, stored verbatim.
    pub metadata: Metadata,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// When the metadata was last patched.
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed effect on the account balance (positive for credit, negative for debit).
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        match self.entry_type {
            EntryType::Credit => self.amount,
            EntryType::Debit => -self.amount,
        }
    }
}

/// Input for one side of a pair. The side (debit or credit) is given by its position in [`EntryPair`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLedgerEntry {
    /// Caller-supplied ID. Generated by the store when absent.
    pub id: Option<LedgerEntryId>,
    /// The account affected.
    pub account_id: AccountId,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Origin tag.
    pub source: String,
    /// Human-readable note.
    pub description: String,
    /// Actor attribution.
    pub user_id: Option<UserId>,
    /// Opaque payload. Stored as an empty object when absent.
    pub metadata: Option<Metadata>,
}

impl NewLedgerEntry {
    /// Creates an entry input for `account_id` carrying `amount`.
    #[must_use]
    pub fn new(account_id: AccountId, amount: i64) -> Self {
        Self {
            account_id,
            amount,
            ..Self::default()
        }
    }

    /// Sets the caller-supplied ID.
    #[must_use]
    pub fn with_id(mut self, id: LedgerEntryId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the origin tag.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A matched debit/credit pair to be written atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPair {
    /// The side that decreases `debit.account_id`.
    pub debit: NewLedgerEntry,
    /// The side that increases `credit.account_id`.
    pub credit: NewLedgerEntry,
}

impl EntryPair {
    /// Creates a pair.
    #[must_use]
    pub fn new(debit: NewLedgerEntry, credit: NewLedgerEntry) -> Self {
        Self { debit, credit }
    }

    /// Replaces absent metadata on both sides with an empty object.
    #[must_use]
    pub fn with_default_metadata(mut self) -> Self {
        self.debit.metadata.get_or_insert_with(Metadata::new);
        self.credit.metadata.get_or_insert_with(Metadata::new);
        self
    }

    /// Returns true when the debited account is subject to the sufficiency policy.
    #[must_use]
    pub fn debits_customer(&self) -> bool {
        !self.debit.account_id.is_platform()
    }
}

/// Filter options for listing entries. All bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Restrict to one account.
    pub account_id: Option<AccountId>,
    /// Earliest `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Latest `created_at`.
    pub end: Option<DateTime<Utc>>,
}

impl EntryFilter {
    /// Filter for all entries of one account.
    #[must_use]
    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }
}

/// Half-open time window `[start, end)` used for range balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive lower bound on `created_at`.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound on `created_at`.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a window from `start` (inclusive) to `end` (exclusive).
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_entry(entry_type: EntryType, amount: i64) -> LedgerEntry {
        let now = Utc::now();
        LedgerEntry {
            id: LedgerEntryId::new(),
            account_id: AccountId::new(),
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

    #[rstest]
    #[case(EntryType::Debit, 40, -40)]
    #[case(EntryType::Credit, 40, 40)]
    #[case(EntryType::Debit, 0, 0)]
    fn test_signed_amount(#[case] entry_type: EntryType, #[case] amount: i64, #[case] expected: i64) {
        assert_eq!(make_entry(entry_type, amount).signed_amount(), expected);
    }

    #[test]
    fn test_entry_type_round_trips_through_str() {
        assert_eq!("debit".parse::<EntryType>(), Ok(EntryType::Debit));
        assert_eq!("credit".parse::<EntryType>(), Ok(EntryType::Credit));
        assert_eq!(EntryType::Debit.to_string(), "debit");
        assert_eq!(
            "refund".parse::<EntryType>(),
            Err(UnknownEntryType("refund".to_string()))
        );
    }

    #[test]
    fn test_default_metadata_keeps_existing_payload() {
        let mut payload = Metadata::new();
        payload.insert("invoice".to_string(), serde_json::json!("inv_1"));

        let pair = EntryPair::new(
            NewLedgerEntry::new(AccountId::new(), 10).with_metadata(payload.clone()),
            NewLedgerEntry::new(AccountId::PLATFORM, 10),
        )
        .with_default_metadata();

        assert_eq!(pair.debit.metadata, Some(payload));
        assert_eq!(pair.credit.metadata, Some(Metadata::new()));
    }

    #[test]
    fn test_platform_debit_is_exempt() {
        let pair = EntryPair::new(
            NewLedgerEntry::new(AccountId::PLATFORM, 10),
            NewLedgerEntry::new(AccountId::new(), 10),
        );
        assert!(!pair.debits_customer());
    }

    #[test]
    fn test_time_range_is_half_open() {
        let start = Utc::now();
        let end = start + chrono::Duration::hours(1);
        let range = TimeRange::new(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end - chrono::Duration::seconds(1)));
        assert!(!range.contains(end));
        assert!(!range.contains(start - chrono::Duration::seconds(1)));
    }
}
