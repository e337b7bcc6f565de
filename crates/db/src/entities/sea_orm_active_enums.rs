//! `SeaORM` active enums.

use creditline_core::ledger::EntryType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted side of a ledger entry (`billing_transactions.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EntryKind {
    /// Debit row.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit row.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<EntryType> for EntryKind {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

impl From<EntryKind> for EntryType {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Debit => Self::Debit,
            EntryKind::Credit => Self::Credit,
        }
    }
}
