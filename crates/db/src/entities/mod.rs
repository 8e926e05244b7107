//! `SeaORM` entity definitions for the ledger schema (spec 6).
//!
//! One module per component, grouping the tables that component owns.
//! Entities carry only the columns named in spec 6; derived/aggregate
//! fields stay in `zeltra-core`'s domain types and are never persisted
//! redundantly.

pub mod ar_ap;
pub mod balance;
pub mod coa;
pub mod currency;
pub mod fixed_assets;
pub mod inventory;
pub mod period;
pub mod voucher;
