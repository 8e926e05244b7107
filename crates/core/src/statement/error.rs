//! Errors and warnings raised by the statement and reconciliation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while deriving or validating a statement (spec 4.5.1,
/// 6's `{error: true, code, ...}` shape, 7's Consistency error kind).
#[derive(Debug, Error, PartialEq)]
pub enum StatementError {
    /// `total_assets != total_liabilities + total_equity` beyond
    /// tolerance (P3).
    #[error("accounting identity broken: assets {assets}, liabilities+equity {liabilities_and_equity}, diff {diff}")]
    IdentityBroken {
        /// Computed total assets.
        assets: Decimal,
        /// Computed total liabilities plus equity.
        liabilities_and_equity: Decimal,
        /// Signed difference.
        diff: Decimal,
    },

    /// `operating + investing + financing != closing_cash - opening_cash`
    /// beyond tolerance (P4).
    #[error("cash flow does not reconcile: derived {derived}, actual {actual}, diff {diff}")]
    CashNotReconciled {
        /// Sum of the three cash-flow sections.
        derived: Decimal,
        /// `closing_cash - opening_cash`.
        actual: Decimal,
        /// Signed difference.
        diff: Decimal,
    },

    /// A sweep or explain request named a driver field that does not
    /// exist on [`super::driver::DriverRecord`].
    #[error("unknown driver field: {0}")]
    UnknownField(String),

    /// An explain request named a computed field with no formula
    /// entry in [`super::explain`].
    #[error("field is not explainable: {0}")]
    NotExplainable(String),
}

impl StatementError {
    /// Stable machine-readable error code (spec 6).
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityBroken { .. } => "IDENTITY_BROKEN",
            Self::CashNotReconciled { .. } => "CASH_NOT_RECONCILED",
            Self::UnknownField(_) => "UNKNOWN_FIELD",
            Self::NotExplainable(_) => "NOT_EXPLAINABLE",
        }
    }
}

/// Non-fatal warning surfaced by the model-mode convergence loop (spec 7's
/// Convergence error kind: "non-fatal warning; the last-iteration result
/// is returned with `iteration_converged = false`").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReconciliationWarning {
    /// The loop exhausted its iteration budget without the interest and
    /// new-borrowing deltas both falling under tolerance.
    BudgetExhausted {
        /// Iterations actually run.
        iterations: u32,
    },
    /// `interest_rate >= 1`, so the design note's monotonic-approach
    /// guarantee (spec 9) does not hold; the sequence may diverge instead
    /// of converging even given an unbounded iteration budget.
    InterestRateNotContractive,
}

impl ReconciliationWarning {
    /// Stable machine-readable error code (spec 6's `ITERATION_DIVERGED`).
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "ITERATION_DIVERGED"
    }

    /// Human-readable explanation for diagnostics.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::BudgetExhausted { iterations } => {
                format!("iteration budget of {iterations} exhausted before convergence")
            }
            Self::InterestRateNotContractive => {
                "interest_rate >= 1 is not a contraction; convergence is not guaranteed".to_string()
            }
        }
    }
}
