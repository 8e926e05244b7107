//! Period close/reopen orchestration (spec 4.3).
//!
//! These functions are pure: they take already-loaded balances and
//! templates and return a plan of voucher requests for the caller to
//! submit through the voucher store (C2), mirroring how
//! `ledger::service::LedgerService` stays free of persistence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use zeltra_shared::types::VoucherId;

use crate::coa::{Account, DimensionKey};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{EntryKind, Voucher, VoucherEntryRequest, VoucherRequest};

use super::types::{ClosingRule, ClosingTemplate};

/// One source account's net period activity feeding a closing rule.
#[derive(Debug, Clone)]
pub struct ClosingSource {
    /// The account.
    pub account: Account,
    /// Net change for the period, raw `debit_total - credit_total` (*not*
    /// signed per the account's own normal side): positive means the
    /// account grew on the debit side, negative means it grew on the
    /// credit side.
    pub net_change: Decimal,
}

/// The `net_change` a [`ClosingSource`] must carry for
/// [`evaluate_closing_template`]'s sign convention: raw `debit_total -
/// credit_total`, never the account's own normal-side-signed activity.
/// Callers aggregating balance rows (e.g. the API layer's
/// `closing_sources()`) should build every `ClosingSource` through this
/// function rather than re-deriving the sign themselves.
#[must_use]
pub fn raw_net_change(debit_total: Decimal, credit_total: Decimal) -> Decimal {
    debit_total - credit_total
}

/// The result of evaluating every active closing template for a period: a
/// set of balanced voucher requests ready for submission, plus the period
/// to roll afterward.
#[derive(Debug, Clone)]
pub struct ClosingPlan {
    /// One voucher request per template that produced a nonzero closing
    /// entry.
    pub vouchers: Vec<VoucherRequest>,
}

/// Evaluates one closing template against a set of already-loaded source
/// balances for the period being closed.
///
/// # Errors
///
/// Returns [`LedgerError::TemplateDisabled`] if the template is inactive,
/// or [`LedgerError::TemplateUnbalanced`] if (due to a data error) the
/// synthesized voucher would not balance — this should never happen given
/// the construction below, since the rule flattens sources into exactly
/// one target line equal to their net, but the check is kept as the
/// "rejection must precede any state mutation" guarantee of P8.
pub fn evaluate_closing_template(
    template: &ClosingTemplate,
    period: &str,
    posting_date: NaiveDate,
    sources: &[ClosingSource],
) -> Result<Option<VoucherRequest>, LedgerError> {
    if !template.is_active {
        return Err(LedgerError::TemplateDisabled(template.code.clone()));
    }

    let matching: Vec<&ClosingSource> = sources
        .iter()
        .filter(|s| template.rule.sources.matches(&s.account))
        .collect();

    let net: Decimal = matching.iter().map(|s| s.net_change).sum();
    if net == Decimal::ZERO {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(matching.len() + 1);
    for source in &matching {
        if source.net_change == Decimal::ZERO {
            continue;
        }
        // net_change is raw debit-minus-credit: a positive net_change grew
        // on the debit side and is closed out with a credit, and vice
        // versa, regardless of the account's own normal side.
        let (debit, credit) = if source.net_change > Decimal::ZERO {
            (Decimal::ZERO, source.net_change)
        } else {
            (-source.net_change, Decimal::ZERO)
        };
        entries.push(VoucherEntryRequest {
            account_code: source.account.code.clone(),
            description: Some(template.rule.description_template.replace("{period}", period)),
            debit,
            credit,
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        });
    }

    let (target_debit, target_credit) = if net > Decimal::ZERO {
        (net, Decimal::ZERO)
    } else {
        (Decimal::ZERO, -net)
    };
    entries.push(VoucherEntryRequest {
        account_code: template.rule.target_account.clone(),
        description: Some(template.rule.description_template.replace("{period}", period)),
        debit: target_debit,
        credit: target_credit,
        currency: None,
        fx_rate: None,
        foreign_debit: None,
        foreign_credit: None,
        dimensions: DimensionKey::none(),
    });

    let total_debit: Decimal = entries.iter().map(|e| e.debit).sum();
    let total_credit: Decimal = entries.iter().map(|e| e.credit).sum();
    if (total_debit - total_credit).abs() > crate::ledger::types::BALANCE_TOLERANCE {
        return Err(LedgerError::TemplateUnbalanced(template.code.clone()));
    }

    Ok(Some(VoucherRequest {
        posting_date,
        description: template.rule.description_template.replace("{period}", period),
        // The period being closed is in `adjustment` status by the time
        // close() runs (spec 4.3 step 1-2 follow `enter_adjustment`), and
        // `PeriodStatus::admits` only accepts `EntryKind::Adjustment`
        // vouchers there -- a `Normal` closing voucher would be rejected
        // with `PERIOD_ADJUSTMENT_ONLY` by its own admission check.
        entry_type: EntryKind::Adjustment,
        entries,
        source_template: Some(template.code.clone()),
        source_event_id: None,
    }))
}

/// Evaluates every active template selected for a period, building the
/// full [`ClosingPlan`] (close step 2-3 of spec 4.3). Templates are
/// evaluated in the order given; if any rejects, no vouchers from this
/// call are returned — rejection precedes any state mutation (P8).
///
/// # Errors
///
/// Propagates the first template evaluation error.
pub fn build_closing_plan(
    templates: &[ClosingTemplate],
    period: &str,
    posting_date: NaiveDate,
    sources: &[ClosingSource],
) -> Result<ClosingPlan, LedgerError> {
    let mut vouchers = Vec::new();
    for template in templates {
        if let Some(voucher) = evaluate_closing_template(template, period, posting_date, sources)?
        {
            vouchers.push(voucher);
        }
    }
    Ok(ClosingPlan { vouchers })
}

/// The effect of reopening a closed period: which closing vouchers must be
/// voided, and — only when the following period already had activity — an
/// adjustment-carry voucher capturing the delta (spec 4.3's reopen step).
#[derive(Debug, Clone)]
pub struct ReopenPlan {
    /// Closing vouchers from the period being reopened that must now be
    /// voided.
    pub vouchers_to_void: Vec<VoucherId>,
    /// Whether the next period had its own activity (so its opening
    /// balances cannot simply be rolled back) and instead needs an
    /// adjustment-carry voucher.
    pub next_period_has_activity: bool,
}

impl ReopenPlan {
    /// Builds the reopen plan from the set of voucher ids that were
    /// synthesized by closing templates during this period's close, and
    /// whether the following period has had any of its own confirmed
    /// activity since rollover.
    #[must_use]
    pub fn new(closing_voucher_ids: Vec<VoucherId>, next_period_has_activity: bool) -> Self {
        Self {
            vouchers_to_void: closing_voucher_ids,
            next_period_has_activity,
        }
    }
}

/// Validates that a voucher is eligible to be void'd as part of a reopen —
/// it must be `confirmed` and must have been produced by a closing
/// template (`source_template.is_some()`), not an arbitrary business
/// voucher.
#[must_use]
pub fn is_closing_voucher(voucher: &Voucher) -> bool {
    voucher.source_template.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::{AccountType, CashFlowCategory, NormalSide};
    use rust_decimal_macros::dec;

    fn account(code: &str, account_type: AccountType) -> Account {
        Account {
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            normal_side: account_type.default_normal_side(),
            cash_flow_category: CashFlowCategory::None,
            parent_code: None,
            enabled: true,
            system_seeded: false,
            revaluable: false,
        }
    }

    fn pnl_template() -> ClosingTemplate {
        ClosingTemplate {
            code: "PNL_TO_RE".into(),
            name: "P&L to retained earnings".into(),
            rule: ClosingRule {
                sources: super::super::types::AccountSelector {
                    prefixes: vec![],
                    account_types: vec![AccountType::Revenue, AccountType::Expense],
                },
                target_account: "3200".into(),
                description_template: "Close P&L for {period}".into(),
            },
            is_active: true,
        }
    }

    #[test]
    fn closes_revenue_and_expense_into_retained_earnings() {
        // net_change is built via `raw_net_change(debit_total, credit_total)`,
        // the same function the API layer's `closing_sources()` calls over
        // aggregated balance rows, so this test covers the sign contract
        // between that aggregation step and `evaluate_closing_template`
        // end to end rather than hand-picking a sign.
        let sources = vec![
            ClosingSource {
                account: account("4000", AccountType::Revenue),
                // Revenue (credit-normal) posted 50000 on the credit side
                // this period, debit_total = 0.
                net_change: raw_net_change(dec!(0), dec!(50000)),
            },
            ClosingSource {
                account: account("5000", AccountType::Expense),
                // Expense (debit-normal) posted 30000 on the debit side
                // this period, credit_total = 0.
                net_change: raw_net_change(dec!(30000), dec!(0)),
            },
        ];
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let voucher = evaluate_closing_template(&pnl_template(), "2025-01", date, &sources)
            .unwrap()
            .unwrap();

        let total_debit: Decimal = voucher.entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = voucher.entries.iter().map(|e| e.credit).sum();
        assert_eq!(total_debit, total_credit);

        let revenue_line = voucher
            .entries
            .iter()
            .find(|e| e.account_code == "4000")
            .unwrap();
        assert_eq!(revenue_line.debit, dec!(50000));

        let expense_line = voucher
            .entries
            .iter()
            .find(|e| e.account_code == "5000")
            .unwrap();
        assert_eq!(expense_line.credit, dec!(30000));

        let target_line = voucher
            .entries
            .iter()
            .find(|e| e.account_code == "3200")
            .unwrap();
        assert_eq!(target_line.credit, dec!(20000));
    }

    #[test]
    fn disabled_template_is_rejected_before_mutation() {
        let mut template = pnl_template();
        template.is_active = false;
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let err = evaluate_closing_template(&template, "2025-01", date, &[]).unwrap_err();
        assert!(matches!(err, LedgerError::TemplateDisabled(_)));
    }

    #[test]
    fn zero_net_change_produces_no_voucher() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let voucher = evaluate_closing_template(&pnl_template(), "2025-01", date, &[])
            .unwrap();
        assert!(voucher.is_none());
    }
}
