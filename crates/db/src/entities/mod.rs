//! `SeaORM` entity definitions for the credit ledger tables.

pub mod billing_accounts;
pub mod billing_transactions;
pub mod sea_orm_active_enums;
