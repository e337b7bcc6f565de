//! Core credit ledger logic for Creditline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry credit ledger: entries, balance policy, credit operations

pub mod ledger;
