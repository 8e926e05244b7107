//! Ledger error types.
//!
//! Every variant corresponds to one of the structured error codes listed in
//! spec section 6 (`{error: true, code, message, details}`), carrying
//! whatever ids/field names/computed totals section 7 requires so a caller
//! can decide the remediation without re-querying.

use rust_decimal::Decimal;
use thiserror::Error;

use zeltra_shared::types::VoucherId;

/// Errors raised by the voucher store, balance engine, and period/closing
/// engine (C2, C3, C4).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Debit total minus credit total falls outside the 0.01 tolerance.
    #[error("voucher not balanced: debit {debit}, credit {credit}, diff {diff}")]
    NotBalanced {
        /// Sum of debit amounts.
        debit: Decimal,
        /// Sum of credit amounts.
        credit: Decimal,
        /// Signed `debit - credit`.
        diff: Decimal,
    },

    /// An entry referenced an account that does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// An entry referenced an account that exists but is disabled.
    #[error("account disabled: {0}")]
    AccountDisabled(String),

    /// An entry referenced a dimension value that does not exist.
    #[error("dimension not found: {0}")]
    DimensionNotFound(String),

    /// An entry referenced a dimension value that exists but is disabled.
    #[error("dimension disabled: {0}")]
    DimensionDisabled(String),

    /// No voucher exists with the given id.
    #[error("voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Operation requires the voucher to be in `reviewed` status.
    #[error("voucher {0} is not in reviewed status")]
    VoucherNotReviewed(VoucherId),

    /// The voucher's period is `closed`; no writes of any entry type are
    /// admitted.
    #[error("period {0} is closed")]
    PeriodClosed(String),

    /// The voucher's period is `adjustment`, which only admits vouchers
    /// with `entry_type = adjustment`.
    #[error("period {0} only admits adjustment entries")]
    PeriodAdjustmentOnly(String),

    /// Attempted to void a voucher that is not `confirmed`.
    #[error("voucher {0} must be confirmed to void")]
    VoidConfirmed(VoucherId),

    /// A closing template that is not active was selected for evaluation.
    #[error("closing template disabled: {0}")]
    TemplateDisabled(String),

    /// Evaluating a template produced an unbalanced voucher.
    #[error("template {0} produced an unbalanced voucher")]
    TemplateUnbalanced(String),

    /// No exchange rate exists for the requested currency/date/rate_type.
    #[error("no exchange rate for {currency} on {date} ({rate_type})")]
    RateNotFound {
        /// Currency code.
        currency: String,
        /// Requested date.
        date: chrono::NaiveDate,
        /// Rate type (spot/closing/average).
        rate_type: String,
    },

    /// An inventory issue would drive an item's quantity negative under the
    /// `reject` negative-inventory policy.
    #[error("negative inventory for {sku}: on-hand {on_hand}, requested {requested}")]
    NegativeInventory {
        /// Item SKU.
        sku: String,
        /// Current on-hand quantity.
        on_hand: Decimal,
        /// Quantity requested to issue.
        requested: Decimal,
    },

    /// Attempted an operation (e.g. `unreview`, `delete`, `confirm`) from a
    /// status that does not permit it.
    #[error("illegal transition for voucher {0}: {1}")]
    IllegalTransition(VoucherId, &'static str),

    /// An entry line carried a nonzero debit and a nonzero credit at once.
    #[error("entry line {0} must not carry both a debit and a credit amount")]
    BothSidesNonZero(i32),

    /// Underlying persistence failure. Capacity-kind error (spec 7):
    /// surfaced with rollback of the current transaction.
    #[error("database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Stable machine-readable error code, matching spec section 6's list
    /// verbatim.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotBalanced { .. } => "NOT_BALANCED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountDisabled(_) => "ACCOUNT_DISABLED",
            Self::DimensionNotFound(_) | Self::DimensionDisabled(_) => "DIMENSION_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherNotReviewed(_) => "VOUCHER_NOT_REVIEWED",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::PeriodAdjustmentOnly(_) => "PERIOD_ADJUSTMENT_ONLY",
            Self::VoidConfirmed(_) => "VOID_CONFIRMED",
            Self::TemplateDisabled(_) => "TEMPLATE_DISABLED",
            Self::TemplateUnbalanced(_) => "TEMPLATE_UNBALANCED",
            Self::RateNotFound { .. } => "RATE_NOT_FOUND",
            Self::NegativeInventory { .. } => "NEGATIVE_INVENTORY",
            Self::IllegalTransition(..) => "ILLEGAL_TRANSITION",
            Self::BothSidesNonZero(_) => "INVALID_ENTRY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status code for the Axum adapter layer.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotBalanced { .. }
            | Self::BothSidesNonZero(_)
            | Self::PeriodClosed(_)
            | Self::PeriodAdjustmentOnly(_)
            | Self::TemplateUnbalanced(_)
            | Self::NegativeInventory { .. }
            | Self::IllegalTransition(..)
            | Self::VoidConfirmed(_)
            | Self::VoucherNotReviewed(_) => 400,
            Self::AccountDisabled(_) | Self::DimensionDisabled(_) | Self::TemplateDisabled(_) => {
                409
            }
            Self::AccountNotFound(_)
            | Self::DimensionNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::RateNotFound { .. } => 404,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn error_codes_match_spec_section_6() {
        assert_eq!(
            LedgerError::NotBalanced {
                debit: dec!(100),
                credit: dec!(50),
                diff: dec!(50),
            }
            .error_code(),
            "NOT_BALANCED"
        );
        assert_eq!(
            LedgerError::AccountNotFound("1001".into()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::PeriodAdjustmentOnly("2025-01".into()).error_code(),
            "PERIOD_ADJUSTMENT_ONLY"
        );
        assert_eq!(
            LedgerError::TemplateUnbalanced("t1".into()).error_code(),
            "TEMPLATE_UNBALANCED"
        );
    }

    #[test]
    fn http_status_codes() {
        assert_eq!(
            LedgerError::NotBalanced {
                debit: dec!(1),
                credit: dec!(2),
                diff: dec!(-1)
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::AccountNotFound("x".into()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::AccountDisabled("x".into()).http_status_code(),
            409
        );
        assert_eq!(LedgerError::Database("x".into()).http_status_code(), 500);
    }
}
