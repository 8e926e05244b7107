//! Ledger-mode statement derivation (spec 4.5.1): aggregates the balance
//! index through a [`StatementMapping`] into Balance Sheet, Income
//! Statement, and (indirect-method) Cash Flow Statement, then checks the
//! accounting identity (P3) and the cash-reconciliation identity (P4).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coa::Account;
use crate::ledger::{Balance, BALANCE_TOLERANCE};

use super::mapping::{field_value, polarity_adjust, CashFlowSection, StatementBucket, StatementSection};
use super::{StatementError, StatementMapping};

/// One rendered statement's lines, in mapping-declaration order.
pub type StatementLines = BTreeMap<String, Decimal>;

/// The indirect-method cash-flow statement (spec 4.5.1), plus the
/// `Δcash` it must reconcile against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// Named operating-section components and their signed values.
    pub operating: StatementLines,
    /// Named investing-section components and their signed values.
    pub investing: StatementLines,
    /// Named financing-section components and their signed values.
    pub financing: StatementLines,
    /// Sum of the operating section.
    pub operating_total: Decimal,
    /// Sum of the investing section.
    pub investing_total: Decimal,
    /// Sum of the financing section.
    pub financing_total: Decimal,
}

impl CashFlowStatement {
    /// `operating_total + investing_total + financing_total`.
    #[must_use]
    pub fn net_change(&self) -> Decimal {
        self.operating_total + self.investing_total + self.financing_total
    }
}

/// The two identity checks a ledger-mode report must pass (P3, P4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Validation {
    /// Whether `total_assets = total_liabilities + total_equity` within
    /// tolerance.
    pub is_balanced: bool,
    /// Signed `total_assets - (total_liabilities + total_equity)`.
    pub balance_diff: Decimal,
    /// Whether the cash-flow statement reconciles to `Δcash` within
    /// tolerance.
    pub cash_reconciled: bool,
    /// Signed `(operating + investing + financing) - Δcash`.
    pub cash_diff: Decimal,
}

/// A fully rendered three-statement report for one period (spec 6's
/// "Statement output shape (ledger mode)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementReport {
    /// Period the report was rendered for.
    pub period: String,
    /// Balance-sheet lines.
    pub balance_sheet: StatementLines,
    /// Income-statement lines.
    pub income_statement: StatementLines,
    /// Indirect-method cash-flow statement.
    pub cash_flow_statement: CashFlowStatement,
    /// Total assets (sum of [`StatementBucket::Asset`] lines).
    pub total_assets: Decimal,
    /// Total liabilities (sum of [`StatementBucket::Liability`] lines).
    pub total_liabilities: Decimal,
    /// Total equity, including net income rolled up from the income
    /// statement (sum of [`StatementBucket::Equity`] lines plus net
    /// income).
    pub total_equity: Decimal,
    /// Net income: revenue lines minus expense lines.
    pub net_income: Decimal,
    /// Opening and closing cash, and the two identity checks.
    pub validation: Validation,
}

/// Looks up one balance row's raw fields for a (account, dimension) pair
/// already filtered to the mapping's selector and dimension filter. The
/// caller supplies `balances` pre-filtered to the target period (and,
/// when rendering net_change or a prior-period cash-flow component, the
/// immediately preceding period is looked up via `prior_balances`).
fn aggregate_line(
    line: &super::mapping::StatementLineMapping,
    balances: &[Balance],
    accounts: &dyn Fn(&str) -> Option<Account>,
) -> Decimal {
    let mut total = Decimal::ZERO;
    for balance in balances {
        let Some(account) = accounts(&balance.key.account_code) else {
            continue;
        };
        if !line.selector.matches(&account) {
            continue;
        }
        if !line.dimension_matches(&balance.key.dimensions) {
            continue;
        }
        let raw = field_value(
            balance.opening_balance,
            balance.debit_total,
            balance.credit_total,
            balance.closing_balance,
            line.source_field,
        );
        total += polarity_adjust(raw, account.normal_side, line.sign);
    }
    total
}

/// Renders the three statements for one period from the balance index.
///
/// `balances` must already be filtered to the target `period`.
/// `opening_cash` / `closing_cash` are the cash-and-equivalents control
/// total for the period boundary, used only for the P4 check — ledger
/// mode does not infer "which account is cash" from the mapping, since a
/// chart may split cash across several accounts under one selector.
#[must_use]
pub fn render(
    mapping: &StatementMapping,
    period: &str,
    balances: &[Balance],
    accounts: impl Fn(&str) -> Option<Account>,
    opening_cash: Decimal,
    closing_cash: Decimal,
) -> StatementReport {
    let mut balance_sheet = StatementLines::new();
    let mut income_statement = StatementLines::new();
    let mut operating = StatementLines::new();
    let mut investing = StatementLines::new();
    let mut financing = StatementLines::new();

    let mut total_assets = Decimal::ZERO;
    let mut total_liabilities = Decimal::ZERO;
    let mut total_equity = Decimal::ZERO;
    let mut revenue = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for line in &mapping.lines {
        let value = aggregate_line(line, balances, &accounts);
        match line.section {
            StatementSection::BalanceSheet => {
                *balance_sheet.entry(line.name.clone()).or_default() += value;
                match line.bucket {
                    StatementBucket::Asset => total_assets += value,
                    StatementBucket::Liability => total_liabilities += value,
                    StatementBucket::Equity => total_equity += value,
                    StatementBucket::Revenue | StatementBucket::Expense => {}
                }
            }
            StatementSection::IncomeStatement => {
                *income_statement.entry(line.name.clone()).or_default() += value;
                match line.bucket {
                    StatementBucket::Revenue => revenue += value,
                    StatementBucket::Expense => expense += value,
                    _ => {}
                }
            }
            StatementSection::CashFlow(component) => {
                let signed = if component.adds() { value } else { -value };
                let section = match component.section() {
                    CashFlowSection::Operating => &mut operating,
                    CashFlowSection::Investing => &mut investing,
                    CashFlowSection::Financing => &mut financing,
                };
                *section.entry(line.name.clone()).or_default() += signed;
            }
        }
    }

    let net_income = revenue - expense;
    // Net income rolls into equity (retained earnings) whether or not the
    // mapping carries an explicit "net_income" cash-flow/operating line;
    // the operating section's net_income entry is separate and additive.
    operating.insert("net_income".to_string(), net_income);
    total_equity += net_income;

    let operating_total: Decimal = operating.values().copied().sum::<Decimal>();
    let investing_total: Decimal = investing.values().copied().sum();
    let financing_total: Decimal = financing.values().copied().sum();

    let cash_flow_statement = CashFlowStatement {
        operating,
        investing,
        financing,
        operating_total,
        investing_total,
        financing_total,
    };

    let balance_diff = total_assets - (total_liabilities + total_equity);
    let is_balanced = balance_diff.abs() <= BALANCE_TOLERANCE;

    let delta_cash = closing_cash - opening_cash;
    let cash_diff = cash_flow_statement.net_change() - delta_cash;
    let cash_reconciled = cash_diff.abs() <= BALANCE_TOLERANCE;

    StatementReport {
        period: period.to_string(),
        balance_sheet,
        income_statement,
        cash_flow_statement,
        total_assets,
        total_liabilities,
        total_equity,
        net_income,
        validation: Validation {
            is_balanced,
            balance_diff,
            cash_reconciled,
            cash_diff,
        },
    }
}

/// Validates an already-rendered report against P3/P4, for callers that
/// want a hard error (spec 7's Consistency kind) instead of reading the
/// `validation` block.
///
/// # Errors
///
/// Returns [`StatementError::IdentityBroken`] or
/// [`StatementError::CashNotReconciled`] when the respective check fails.
pub fn assert_identities(report: &StatementReport) -> Result<(), StatementError> {
    if !report.validation.is_balanced {
        return Err(StatementError::IdentityBroken {
            assets: report.total_assets,
            liabilities_and_equity: report.total_liabilities + report.total_equity,
            diff: report.validation.balance_diff,
        });
    }
    if !report.validation.cash_reconciled {
        return Err(StatementError::CashNotReconciled {
            derived: report.cash_flow_statement.net_change(),
            actual: report.cash_flow_statement.net_change() - report.validation.cash_diff,
            diff: report.validation.cash_diff,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::{AccountType, CashFlowCategory, DimensionKey, NormalSide};
    use crate::ledger::BalanceKey;
    use rust_decimal_macros::dec;

    fn account(code: &str, account_type: AccountType, normal_side: NormalSide) -> Account {
        Account {
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            normal_side,
            cash_flow_category: CashFlowCategory::None,
            parent_code: None,
            enabled: true,
            system_seeded: false,
            revaluable: false,
        }
    }

    fn row(code: &str, period: &str, opening: Decimal, closing: Decimal) -> Balance {
        Balance {
            key: BalanceKey::new(code, period, DimensionKey::none()),
            opening_balance: opening,
            debit_total: (closing - opening).max(Decimal::ZERO),
            credit_total: (opening - closing).max(Decimal::ZERO),
            closing_balance: closing,
            foreign_opening_balance: None,
            foreign_debit_total: None,
            foreign_credit_total: None,
            foreign_closing_balance: None,
        }
    }

    #[test]
    fn balanced_ledger_passes_both_identities() {
        let mapping = StatementMapping::standard();
        let balances = vec![
            row("1001", "2025-01", dec!(1000), dec!(1020)), // cash, asset
            row("2001", "2025-01", dec!(0), dec!(0)),       // liability
            row("3001", "2025-01", dec!(1000), dec!(1000)), // equity (capital)
            row("5001", "2025-01", dec!(0), dec!(50)),      // revenue (credit-normal)
            row("6001", "2025-01", dec!(0), dec!(30)),      // expense (debit-normal)
        ];
        let lookup = |code: &str| -> Option<Account> {
            match code {
                "1001" => Some(account("1001", AccountType::Asset, NormalSide::Debit)),
                "2001" => Some(account("2001", AccountType::Liability, NormalSide::Credit)),
                "3001" => Some(account("3001", AccountType::Equity, NormalSide::Credit)),
                "5001" => Some(account("5001", AccountType::Revenue, NormalSide::Credit)),
                "6001" => Some(account("6001", AccountType::Expense, NormalSide::Debit)),
                _ => None,
            }
        };
        let report = render(&mapping, "2025-01", &balances, lookup, dec!(1000), dec!(1020));
        assert_eq!(report.net_income, dec!(20));
        assert!(report.validation.is_balanced, "diff={}", report.validation.balance_diff);
        assert!(report.validation.cash_reconciled, "diff={}", report.validation.cash_diff);
        assert!(assert_identities(&report).is_ok());
    }

    #[test]
    fn broken_identity_is_detected() {
        let mapping = StatementMapping::standard();
        let balances = vec![row("1001", "2025-01", dec!(1000), dec!(1500))];
        let lookup = |code: &str| -> Option<Account> {
            (code == "1001").then(|| account("1001", AccountType::Asset, NormalSide::Debit))
        };
        let report = render(&mapping, "2025-01", &balances, lookup, dec!(1000), dec!(1500));
        assert!(!report.validation.is_balanced);
        assert!(assert_identities(&report).is_err());
    }
}
