//! Statement & Reconciliation Engine (C6, spec 4.5).
//!
//! Two independent modes over two independent inputs:
//!
//! - [`ledger_mode`] aggregates the balance index (C3) through a
//!   declarative [`mapping`] into the three primary statements and checks
//!   the accounting and cash identities (P3, P4).
//! - [`model_mode`] runs the five-step driver-based reconciliation loop
//!   (Financing -> Depreciation -> P&L -> Equity -> Reconcile) with
//!   fixed-point iteration over the debt/interest/cash cycle (P9), plus
//!   [`diagnose`], [`scenario`], and [`explain`] sub-modes.
//!
//! Both modes are pure functions: no I/O, no database access. Callers in
//! `zeltra-db`/`zeltra-api` supply already-aggregated balance rows or a
//! driver record and render the result.

pub mod diagnose;
pub mod driver;
pub mod error;
pub mod explain;
pub mod ledger_mode;
pub mod mapping;
pub mod model_mode;
pub mod scenario;

pub use driver::DriverRecord;
pub use error::{ReconciliationWarning, StatementError};
pub use explain::{explain, ExplainNode};
pub use ledger_mode::{render, CashFlowStatement, StatementReport, Validation};
pub use mapping::{
    CashFlowComponent, Selector, Sign, SourceField, StatementBucket, StatementLineMapping,
    StatementMapping, StatementSection,
};
pub use model_mode::{iterate, run_once, IterationOutcome, ReconciliationResult};
pub use scenario::{scenario_sweep, ScenarioPoint};
