//! Core ledger and reconciliation logic for the workspace.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here; repositories in `zeltra-db` load data and hand it to these
//! functions as plain values plus lookup closures.
//!
//! # Modules
//!
//! - `coa` — chart of accounts and the five auxiliary dimensions (C1)
//! - `ledger` — voucher store: state machine, admission rules, the balance
//!   index (C2 + C3)
//! - `period` — period lifecycle, templated closing entries, and the
//!   voucher/closing template expression language (C4)
//! - `subledger` — AR/AP, inventory costing, fixed assets, and FX
//!   revaluation, each translating business events into balanced voucher
//!   requests (C5)
//! - `statement` — ledger-mode statement derivation and model-mode
//!   five-step reconciliation (C6)
//! - `currency` — exchange rate lookup and money rounding helpers

pub mod coa;
pub mod currency;
pub mod ledger;
pub mod period;
pub mod statement;
pub mod subledger;
