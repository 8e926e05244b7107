//! Errors for chart-of-accounts and dimension mutation.

use thiserror::Error;

/// Errors raised while creating or mutating accounts and dimensions.
#[derive(Debug, Error)]
pub enum CoaError {
    /// Referenced parent account does not exist.
    #[error("parent account not found: {0}")]
    ParentNotFound(String),

    /// Parent account's type does not match the child's declared type.
    #[error("account {code} has type {child_type:?} but parent {parent_code} has type {parent_type:?}")]
    ParentTypeMismatch {
        /// Code of the account being created.
        code: String,
        /// Declared type of the account being created.
        child_type: super::AccountType,
        /// Code of the parent account.
        parent_code: String,
        /// Type of the parent account.
        parent_type: super::AccountType,
    },

    /// Account code is empty or otherwise malformed.
    #[error("account code must be non-empty")]
    EmptyCode,

    /// Attempted to delete an account that has been posted to, or that was
    /// seeded at boot time. Accounts may only be disabled.
    #[error("account {0} cannot be deleted (system-seeded or already posted to); disable it instead")]
    DeleteNotAllowed(String),

    /// A dimension reference on an entry line does not resolve to an
    /// enabled dimension value of the expected type.
    #[error("dimension not found: {0}")]
    DimensionNotFound(String),

    /// Dimension value is disabled.
    #[error("dimension {0} is disabled")]
    DimensionDisabled(String),
}
