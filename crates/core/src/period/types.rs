//! Period, closing-template, and voucher-template domain types (spec 3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::EntryKind;

/// Lifecycle status of a period (spec 3/4.3: `open -> adjustment -> closed
/// -> open`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Admits `normal` vouchers.
    Open,
    /// Admits only `adjustment` vouchers.
    Adjustment,
    /// Admits no vouchers at all.
    Closed,
}

impl PeriodStatus {
    /// Whether a voucher of the given entry kind is admitted while the
    /// period is in this status.
    #[must_use]
    pub fn admits(self, entry_type: EntryKind) -> bool {
        match self {
            Self::Open => matches!(entry_type, EntryKind::Normal),
            Self::Adjustment => matches!(entry_type, EntryKind::Adjustment),
            Self::Closed => false,
        }
    }

    /// Whether `open -> adjustment` (manual) is legal from this status.
    #[must_use]
    pub fn can_enter_adjustment(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether `adjustment -> closed` (the close operation) is legal.
    #[must_use]
    pub fn can_close(self) -> bool {
        matches!(self, Self::Adjustment)
    }

    /// Whether `closed -> open` (reopen) is legal.
    #[must_use]
    pub fn can_reopen(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A period, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// `YYYY-MM` key.
    pub period: String,
    /// Current status.
    pub status: PeriodStatus,
    /// When the period was first opened.
    pub opened_at: Option<DateTime<Utc>>,
    /// When the period was last closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Selector for which accounts a closing template rule applies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSelector {
    /// Match accounts whose code starts with any of these prefixes. Empty
    /// means "no prefix restriction".
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Match accounts of any of these types. Empty means "no type
    /// restriction".
    #[serde(default)]
    pub account_types: Vec<crate::coa::AccountType>,
}

impl AccountSelector {
    /// Whether `account` matches this selector.
    #[must_use]
    pub fn matches(&self, account: &crate::coa::Account) -> bool {
        let prefix_ok = self.prefixes.is_empty()
            || self
                .prefixes
                .iter()
                .any(|p| account.code.starts_with(p.as_str()));
        let type_ok =
            self.account_types.is_empty() || self.account_types.contains(&account.account_type);
        prefix_ok && type_ok
    }
}

/// A declarative closing rule: flatten matching source accounts into a
/// target account (spec 4.3's "flatten revenue and expense accounts into
/// retained earnings" example).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingRule {
    /// Accounts whose period activity (net_change) feeds this rule.
    pub sources: AccountSelector,
    /// Account the net balance of the sources is closed into.
    pub target_account: String,
    /// Description template for the synthesized voucher (`{period}` is
    /// substituted).
    pub description_template: String,
}

/// A closing template: a code, a name, and a declarative rule (spec 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingTemplate {
    /// Stable code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// The rule evaluated at close time.
    pub rule: ClosingRule,
    /// Whether this template currently participates in closes.
    pub is_active: bool,
}

/// One entry shape within a [`VoucherTemplate`]: which account to post to,
/// and the expressions producing its debit/credit amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntryShape {
    /// Account code to post to. May itself be a literal (most templates
    /// have a fixed chart of target accounts).
    pub account_code: String,
    /// Expression producing the debit amount (evaluates to 0 if this line
    /// is a credit line).
    pub debit_expr: Option<String>,
    /// Expression producing the credit amount.
    pub credit_expr: Option<String>,
    /// Dimension expressions, keyed by dimension type code
    /// (`department`, `project`, ...), evaluated against the event's
    /// string-typed fields. Left empty for untagged lines.
    #[serde(default)]
    pub dimension_fields: std::collections::BTreeMap<String, String>,
}

/// Pairs an event schema with entry shapes whose amounts are expressions
/// over event fields (spec 3/4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherTemplate {
    /// Stable code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Entry shapes synthesized from one event.
    pub entries: Vec<TemplateEntryShape>,
    /// Whether this template is currently usable.
    pub is_active: bool,
}
