//! Period & Closing Engine (C4).
//!
//! Governs per-period status, executes templated closing entries, produces
//! reversal entries on reopen, and enforces write-admission rules (spec
//! 4.3).

pub mod closing;
pub mod rules;
pub mod types;

pub use closing::{ClosingPlan, ReopenPlan};
pub use rules::{Expr, RuleError};
pub use types::{ClosingTemplate, Period, PeriodStatus, VoucherTemplate};
