//! Chart of Accounts & Dimensions (C1).
//!
//! Holds the account tree (code, type, normal side, cash-flow category) and
//! the five auxiliary dimensions. This module owns only validation and
//! shape — persistence lives in `zeltra-db`'s `account`/`dimension`
//! repositories.

pub mod account;
pub mod dimension;
pub mod error;

pub use account::{Account, AccountType, CashFlowCategory, NormalSide};
pub use dimension::{Dimension, DimensionKey, DimensionType};
pub use error::CoaError;
