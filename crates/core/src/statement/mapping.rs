//! The declarative statement mapping (spec 4.5.1): for each statement
//! line, a set of selectors, a source field, a sign, and an optional
//! dimension filter. [`super::ledger_mode::render`] walks this mapping
//! against the balance index to produce the three statements.

use serde::{Deserialize, Serialize};

use crate::coa::{Account, AccountType, DimensionKey, DimensionType, NormalSide};
use zeltra_shared::types::DimensionValueId;

/// Which field of a balance row a line reads (spec 4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceField {
    /// `opening_balance`.
    OpeningBalance,
    /// `closing_balance`.
    ClosingBalance,
    /// `debit_total`.
    DebitTotal,
    /// `credit_total`.
    CreditTotal,
    /// `closing_balance - opening_balance` (the period's signed
    /// activity), used for income-statement lines.
    NetChange,
}

/// Which polarity counts as positive for a line (spec 4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    /// Debit-positive.
    Debit,
    /// Credit-positive.
    Credit,
}

/// Selects which accounts a line aggregates over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selector {
    /// Account-code prefixes (matched with `starts_with`). Empty means
    /// "no prefix restriction".
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Account types. Empty means "no type restriction".
    #[serde(default)]
    pub account_types: Vec<AccountType>,
}

impl Selector {
    /// A selector matching every account of the given type, any code.
    #[must_use]
    pub fn of_type(account_type: AccountType) -> Self {
        Self {
            prefixes: Vec::new(),
            account_types: vec![account_type],
        }
    }

    /// A selector matching any account whose code starts with `prefix`.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
            account_types: Vec::new(),
        }
    }

    /// Whether `account` satisfies this selector.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        let prefix_ok = self.prefixes.is_empty()
            || self.prefixes.iter().any(|p| account.code.starts_with(p.as_str()));
        let type_ok = self.account_types.is_empty() || self.account_types.contains(&account.account_type);
        prefix_ok && type_ok
    }
}

/// Which of the three statements (or which cash-flow component) a line
/// feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementSection {
    /// Feeds `balance_sheet`.
    BalanceSheet,
    /// Feeds `income_statement`.
    IncomeStatement,
    /// Feeds one indirect-method cash-flow component (spec 4.5.1).
    CashFlow(CashFlowComponent),
}

/// The bucket a balance-sheet or income-statement line rolls into for the
/// identity checks (P3): which of the five fundamental account types it
/// represents. Distinct from [`Selector::account_types`] because a line's
/// selector may use a bare code prefix without repeating the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementBucket {
    /// Rolls into `total_assets`.
    Asset,
    /// Rolls into `total_liabilities`.
    Liability,
    /// Rolls into `total_equity`.
    Equity,
    /// Rolls into net income via the income statement.
    Revenue,
    /// Rolls into net income via the income statement.
    Expense,
}

/// One indirect-method cash-flow-statement component (spec 4.5.1). Net
/// income itself is not a component here: it is read directly off the
/// rendered income statement rather than re-aggregated from balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowComponent {
    /// Operating: depreciation and amortization add-back.
    Depreciation,
    /// Operating: impairment add-back.
    Impairment,
    /// Operating: loss on disposal add-back.
    LossOnDisposal,
    /// Operating: gain on disposal, subtracted.
    GainOnDisposal,
    /// Operating: change in receivables (a net_change on the AR control
    /// account), subtracted when positive.
    DeltaReceivable,
    /// Operating: change in inventory, subtracted when positive.
    DeltaInventory,
    /// Operating: change in payables, added when positive.
    DeltaPayable,
    /// Operating: any other non-cash adjustment, added.
    OtherNonCash,
    /// Investing: capital expenditure (change in fixed-asset original
    /// cost, excluding impairment), subtracted.
    Capex,
    /// Investing: proceeds from asset disposals, added.
    DisposalProceeds,
    /// Financing: change in interest-bearing debt.
    DeltaDebt,
    /// Financing: new equity issued.
    NewEquity,
    /// Financing: dividends paid, subtracted.
    DividendsPaid,
}

impl CashFlowComponent {
    /// Which of the three cash-flow sections this component belongs to.
    #[must_use]
    pub fn section(self) -> CashFlowSection {
        match self {
            Self::Depreciation
            | Self::Impairment
            | Self::LossOnDisposal
            | Self::GainOnDisposal
            | Self::DeltaReceivable
            | Self::DeltaInventory
            | Self::DeltaPayable
            | Self::OtherNonCash => CashFlowSection::Operating,
            Self::Capex | Self::DisposalProceeds => CashFlowSection::Investing,
            Self::DeltaDebt | Self::NewEquity | Self::DividendsPaid => CashFlowSection::Financing,
        }
    }

    /// The sign under which this component enters its section's total
    /// (spec 4.5.1's enumerated formula): `true` adds, `false` subtracts.
    #[must_use]
    pub fn adds(self) -> bool {
        !matches!(
            self,
            Self::GainOnDisposal | Self::DeltaReceivable | Self::DeltaInventory | Self::Capex | Self::DividendsPaid
        )
    }
}

/// The three cash-flow-statement sections (spec 4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlowSection {
    /// Net income plus non-cash add-backs minus working-capital increases.
    Operating,
    /// Capex minus disposal proceeds.
    Investing,
    /// Debt, equity, and dividend movements.
    Financing,
}

/// One line of the declarative mapping document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLineMapping {
    /// Line name, e.g. `"cash_and_equivalents"`, `"revenue"`.
    pub name: String,
    /// Which statement/component this line feeds.
    pub section: StatementSection,
    /// Which identity bucket this line rolls into. Ignored for
    /// `CashFlow` lines, which are not part of the BS/IS identity roll-up.
    pub bucket: StatementBucket,
    /// Which accounts this line aggregates.
    pub selector: Selector,
    /// Which balance field to read.
    pub source_field: SourceField,
    /// Which polarity is positive for this line.
    pub sign: Sign,
    /// Restrict aggregation to entries carrying this dimension value, if
    /// set (spec 4.5.1's "optional dimension filters").
    #[serde(default)]
    pub dimension_filter: Option<(DimensionType, DimensionValueId)>,
}

impl StatementLineMapping {
    pub(crate) fn dimension_matches(&self, dimensions: &DimensionKey) -> bool {
        let Some((dim_type, value)) = self.dimension_filter else {
            return true;
        };
        let actual = match dim_type {
            DimensionType::Department => dimensions.department,
            DimensionType::Project => dimensions.project,
            DimensionType::Customer => dimensions.customer,
            DimensionType::Supplier => dimensions.supplier,
            DimensionType::Employee => dimensions.employee,
        };
        actual == value
    }
}

/// A complete declarative mapping document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementMapping {
    /// All lines, in declaration order (preserved into the rendered
    /// report for presentation).
    pub lines: Vec<StatementLineMapping>,
}

impl StatementMapping {
    /// A standard mapping matching the Chinese-MoF-style chart used by
    /// the reference seed data (spec 4.6): assets under `"1"`,
    /// liabilities under `"2"`, equity under `"3"`, revenue under `"5"`,
    /// expense under `"5" ` split from COGS and period expenses under
    /// `"6"`. Implementers seeding a different chart supply their own
    /// mapping; this is a convenience default exercised by tests.
    #[must_use]
    pub fn standard() -> Self {
        let bs = |name: &str, prefix: &str, bucket: StatementBucket, sign: Sign| StatementLineMapping {
            name: name.to_string(),
            section: StatementSection::BalanceSheet,
            bucket,
            selector: Selector::prefix(prefix),
            source_field: SourceField::ClosingBalance,
            sign,
            dimension_filter: None,
        };
        let is = |name: &str, prefix: &str, bucket: StatementBucket, sign: Sign| StatementLineMapping {
            name: name.to_string(),
            section: StatementSection::IncomeStatement,
            bucket,
            selector: Selector::prefix(prefix),
            source_field: SourceField::NetChange,
            sign,
            dimension_filter: None,
        };

        Self {
            lines: vec![
                bs("assets", "1", StatementBucket::Asset, Sign::Debit),
                bs("liabilities", "2", StatementBucket::Liability, Sign::Credit),
                bs("equity", "3", StatementBucket::Equity, Sign::Credit),
                is("revenue", "5", StatementBucket::Revenue, Sign::Credit),
                is("cost_and_expense", "6", StatementBucket::Expense, Sign::Debit),
            ],
        }
    }
}

/// Reads one field off a balance row.
#[must_use]
pub fn field_value(
    opening: rust_decimal::Decimal,
    debit: rust_decimal::Decimal,
    credit: rust_decimal::Decimal,
    closing: rust_decimal::Decimal,
    field: SourceField,
) -> rust_decimal::Decimal {
    match field {
        SourceField::OpeningBalance => opening,
        SourceField::ClosingBalance => closing,
        SourceField::DebitTotal => debit,
        SourceField::CreditTotal => credit,
        SourceField::NetChange => closing - opening,
    }
}

/// Adjusts a value's sign so that `requested` is the positive polarity,
/// given the value was produced honoring `normal_side` (spec 3: balances
/// are already signed per the account's normal side).
#[must_use]
pub fn polarity_adjust(value: rust_decimal::Decimal, normal_side: NormalSide, requested: Sign) -> rust_decimal::Decimal {
    let matches = matches!(
        (normal_side, requested),
        (NormalSide::Debit, Sign::Debit) | (NormalSide::Credit, Sign::Credit)
    );
    if matches {
        value
    } else {
        -value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn selector_matches_prefix_and_type() {
        let account = Account {
            code: "1001".into(),
            name: "Cash".into(),
            account_type: AccountType::Asset,
            normal_side: NormalSide::Debit,
            cash_flow_category: crate::coa::CashFlowCategory::Operating,
            parent_code: None,
            enabled: true,
            system_seeded: true,
            revaluable: false,
        };
        assert!(Selector::prefix("1").matches(&account));
        assert!(!Selector::prefix("2").matches(&account));
        assert!(Selector::of_type(AccountType::Asset).matches(&account));
        assert!(!Selector::of_type(AccountType::Liability).matches(&account));
    }

    #[test]
    fn net_change_is_closing_minus_opening() {
        let v = field_value(dec!(100), dec!(50), dec!(0), dec!(150), SourceField::NetChange);
        assert_eq!(v, dec!(50));
    }

    #[test]
    fn polarity_adjust_flips_when_mismatched() {
        assert_eq!(polarity_adjust(dec!(100), NormalSide::Credit, Sign::Debit), dec!(-100));
        assert_eq!(polarity_adjust(dec!(100), NormalSide::Credit, Sign::Credit), dec!(100));
    }
}
