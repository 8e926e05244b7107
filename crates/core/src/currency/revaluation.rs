//! Period-end FX revaluation (spec 4.4): for every `revaluable` account,
//! compare its foreign closing balance translated at the period-end rate
//! against its recorded functional closing balance, and synthesize a gain
//! or loss voucher for the delta.

use rust_decimal::Decimal;

use zeltra_shared::types::{round_money, Currency};

use crate::coa::DimensionKey;
use crate::ledger::{EntryKind, VoucherEntryRequest, VoucherRequest};

/// One revaluable account's state going into a period-end run.
#[derive(Debug, Clone)]
pub struct RevaluationInput {
    /// Account code being revalued.
    pub account_code: String,
    /// Foreign-currency closing balance (unchanged by revaluation).
    pub foreign_closing_balance: Decimal,
    /// Currency the foreign balance is denominated in.
    pub currency: Currency,
    /// Functional-currency closing balance currently recorded.
    pub functional_closing_balance: Decimal,
    /// Period-end rate to translate at.
    pub period_end_rate: Decimal,
}

/// One synthesized gain/loss line, before being wrapped into a voucher.
#[derive(Debug, Clone)]
pub struct RevaluationResult {
    /// The account revalued.
    pub account_code: String,
    /// `foreign_closing_balance * period_end_rate - functional_closing_balance`
    /// (spec 4.4). Positive is a gain, negative is a loss.
    pub delta: Decimal,
}

/// Computes the revaluation delta for one account. Returns `None` when the
/// delta rounds to zero — no voucher is needed.
#[must_use]
pub fn compute_delta(input: &RevaluationInput) -> Option<RevaluationResult> {
    let translated = round_money(input.foreign_closing_balance * input.period_end_rate);
    let delta = translated - input.functional_closing_balance;
    if delta == Decimal::ZERO {
        return None;
    }
    Some(RevaluationResult {
        account_code: input.account_code.clone(),
        delta,
    })
}

/// Builds one balanced voucher posting every nonzero revaluation delta
/// against the configured FX gain/loss account (spec 4.4: "emits a gain or
/// loss voucher against the configured FX accounts"). A positive delta
/// increases the revalued (debit-normal, by convention assets) account and
/// is offset by a credit to the gain/loss account; a negative delta is the
/// mirror image.
///
/// Returns `None` if every input's delta rounds to zero.
#[must_use]
pub fn build_revaluation_voucher(
    inputs: &[RevaluationInput],
    fx_gain_loss_account: &str,
    posting_date: chrono::NaiveDate,
    period: &str,
) -> Option<VoucherRequest> {
    let results: Vec<RevaluationResult> = inputs.iter().filter_map(compute_delta).collect();
    if results.is_empty() {
        return None;
    }

    let mut entries = Vec::with_capacity(results.len() + 1);
    let mut net = Decimal::ZERO;
    for result in &results {
        net += result.delta;
        let (debit, credit) = if result.delta > Decimal::ZERO {
            (result.delta, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -result.delta)
        };
        entries.push(VoucherEntryRequest {
            account_code: result.account_code.clone(),
            description: Some(format!("FX revaluation {period}")),
            debit,
            credit,
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        });
    }

    let (gl_debit, gl_credit) = if net > Decimal::ZERO {
        (Decimal::ZERO, net)
    } else {
        (-net, Decimal::ZERO)
    };
    entries.push(VoucherEntryRequest {
        account_code: fx_gain_loss_account.to_string(),
        description: Some(format!("FX revaluation {period}")),
        debit: gl_debit,
        credit: gl_credit,
        currency: None,
        fx_rate: None,
        foreign_debit: None,
        foreign_credit: None,
        dimensions: DimensionKey::none(),
    });

    Some(VoucherRequest {
        posting_date,
        description: format!("FX revaluation {period}"),
        entry_type: EntryKind::Adjustment,
        entries,
        source_template: Some("FX_REVALUATION".to_string()),
        source_event_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn usd_account_revalued_produces_gain() {
        let input = RevaluationInput {
            account_code: "1122".into(),
            foreign_closing_balance: dec!(100),
            currency: Currency::from_str("USD").unwrap(),
            functional_closing_balance: dec!(700),
            period_end_rate: dec!(7.2),
        };
        let result = compute_delta(&input).unwrap();
        assert_eq!(result.delta, dec!(20));
    }

    #[test]
    fn zero_delta_produces_no_result() {
        let input = RevaluationInput {
            account_code: "1122".into(),
            foreign_closing_balance: dec!(100),
            currency: Currency::from_str("USD").unwrap(),
            functional_closing_balance: dec!(700),
            period_end_rate: dec!(7.0),
        };
        assert!(compute_delta(&input).is_none());
    }

    #[test]
    fn voucher_balances_for_single_gain() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let inputs = vec![RevaluationInput {
            account_code: "1122".into(),
            foreign_closing_balance: dec!(100),
            currency: Currency::from_str("USD").unwrap(),
            functional_closing_balance: dec!(700),
            period_end_rate: dec!(7.2),
        }];
        let voucher = build_revaluation_voucher(&inputs, "7101", date, "2025-01").unwrap();
        let total_debit: Decimal = voucher.entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = voucher.entries.iter().map(|e| e.credit).sum();
        assert_eq!(total_debit, total_credit);

        let asset_line = voucher.entries.iter().find(|e| e.account_code == "1122").unwrap();
        assert_eq!(asset_line.debit, dec!(20));
        let gl_line = voucher.entries.iter().find(|e| e.account_code == "7101").unwrap();
        assert_eq!(gl_line.credit, dec!(20));
    }

    #[test]
    fn no_nonzero_deltas_produces_no_voucher() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let inputs = vec![RevaluationInput {
            account_code: "1122".into(),
            foreign_closing_balance: dec!(100),
            currency: Currency::from_str("USD").unwrap(),
            functional_closing_balance: dec!(700),
            period_end_rate: dec!(7.0),
        }];
        assert!(build_revaluation_voucher(&inputs, "7101", date, "2025-01").is_none());
    }
}
