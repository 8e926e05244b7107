//! AR/AP sub-ledger (spec 4.4): open items, settlement, aging, and
//! provisioning. AR and AP are mirror images of each other (customer vs.
//! supplier counterparty, cash-debit-AR-credit vs. cash-credit-AP-debit on
//! settlement), so the two item types share the aging/provisioning
//! machinery below and differ only in their settlement voucher shape.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::{round_money, ApItemId, ArItemId, DimensionValueId};

use crate::coa::DimensionKey;
use crate::ledger::types::{EntryKind, VoucherEntryRequest, VoucherRequest};

/// An accounts-receivable open item: one customer invoice not yet fully
/// settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArItem {
    /// Unique identifier.
    pub id: ArItemId,
    /// Customer dimension value this item is billed to.
    pub customer: DimensionValueId,
    /// Original invoice amount.
    pub amount: Decimal,
    /// Invoice date — the anchor for aging.
    pub invoice_date: NaiveDate,
    /// Amount not yet settled.
    pub outstanding: Decimal,
}

/// An accounts-payable open item: one supplier invoice not yet fully
/// settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApItem {
    /// Unique identifier.
    pub id: ApItemId,
    /// Supplier dimension value this item is owed to.
    pub supplier: DimensionValueId,
    /// Original invoice amount.
    pub amount: Decimal,
    /// Invoice date — the anchor for aging.
    pub invoice_date: NaiveDate,
    /// Amount not yet settled.
    pub outstanding: Decimal,
}

/// Aging bucket, in days past invoice date (spec 4.4: "`0-30`, `31-60`,
/// `61-90`, `>90`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// 0 to 30 days past the invoice date, inclusive.
    Days0To30,
    /// 31 to 60 days.
    Days31To60,
    /// 61 to 90 days.
    Days61To90,
    /// More than 90 days.
    Over90,
}

impl AgingBucket {
    /// All buckets, in ascending order of age.
    pub const ALL: [Self; 4] = [Self::Days0To30, Self::Days31To60, Self::Days61To90, Self::Over90];

    /// Classifies the number of days an invoice has been outstanding as
    /// of `as_of` into a bucket. A negative age (invoice dated in the
    /// future relative to `as_of`) is treated as `Days0To30`.
    #[must_use]
    pub fn classify(invoice_date: NaiveDate, as_of: NaiveDate) -> Self {
        let days = (as_of - invoice_date).num_days();
        match days {
            d if d <= 30 => Self::Days0To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// Per-bucket outstanding totals (spec 4.4's aging report) plus the
/// per-bucket rates used for bad-debt provisioning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgingReport {
    /// Outstanding total per bucket.
    pub buckets: std::collections::BTreeMap<AgingBucket, Decimal>,
}

impl AgingReport {
    /// Builds the aging report for a set of AR (or AP) items as of a given
    /// date.
    #[must_use]
    pub fn build(outstanding: &[(NaiveDate, Decimal)], as_of: NaiveDate) -> Self {
        let mut buckets = std::collections::BTreeMap::new();
        for &(invoice_date, amount) in outstanding {
            let bucket = AgingBucket::classify(invoice_date, as_of);
            *buckets.entry(bucket).or_insert(Decimal::ZERO) += amount;
        }
        Self { buckets }
    }

    /// Sum of outstanding balances across every bucket. Must equal the
    /// control account's closing balance (spec 8, P10) — the repository
    /// layer is responsible for checking that equality against the live
    /// balance index, since this type has no knowledge of the chart of
    /// accounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.buckets.values().copied().sum()
    }
}

/// Per-bucket provisioning rates (spec 4.4: "applying configured
/// per-bucket rates to outstanding balances"), expressed as a fraction
/// (`0.05` means 5%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProvisionRates {
    /// Rate applied to the `0-30` bucket.
    pub days_0_30: Decimal,
    /// Rate applied to the `31-60` bucket.
    pub days_31_60: Decimal,
    /// Rate applied to the `61-90` bucket.
    pub days_61_90: Decimal,
    /// Rate applied to the `>90` bucket.
    pub over_90: Decimal,
}

impl ProvisionRates {
    fn rate_for(&self, bucket: AgingBucket) -> Decimal {
        match bucket {
            AgingBucket::Days0To30 => self.days_0_30,
            AgingBucket::Days31To60 => self.days_31_60,
            AgingBucket::Days61To90 => self.days_61_90,
            AgingBucket::Over90 => self.over_90,
        }
    }
}

/// Computes the bad-debt provision for an aging report: the sum, over
/// every bucket, of `outstanding * rate`, rounded to the functional
/// currency's two decimal places.
#[must_use]
pub fn compute_provision(report: &AgingReport, rates: &ProvisionRates) -> Decimal {
    let total: Decimal = report
        .buckets
        .iter()
        .map(|(bucket, outstanding)| *outstanding * rates.rate_for(*bucket))
        .sum();
    round_money(total)
}

/// Builds a balanced settlement voucher for one AR open item: debits cash
/// and credits the AR control account. `amount` must not exceed
/// `item.outstanding`.
///
/// # Errors
///
/// Returns [`SettlementError::ExceedsOutstanding`] if `amount >
/// item.outstanding`, or [`SettlementError::NonPositiveAmount`] if `amount
/// <= 0`.
pub fn settle_ar(
    item: &ArItem,
    amount: Decimal,
    cash_account: &str,
    ar_control_account: &str,
    posting_date: NaiveDate,
) -> Result<VoucherRequest, SettlementError> {
    settlement_voucher(
        item.id.to_string(),
        amount,
        item.outstanding,
        cash_account,
        ar_control_account,
        posting_date,
        true,
    )
}

/// Builds a balanced settlement voucher for an AP open item: debits the AP
/// control account and credits cash.
///
/// # Errors
///
/// Returns [`SettlementError::ExceedsOutstanding`] if `amount >
/// item.outstanding`.
pub fn settle_ap(
    item: &ApItem,
    amount: Decimal,
    cash_account: &str,
    ap_control_account: &str,
    posting_date: NaiveDate,
) -> Result<VoucherRequest, SettlementError> {
    settlement_voucher(
        item.id.to_string(),
        amount,
        item.outstanding,
        cash_account,
        ap_control_account,
        posting_date,
        false,
    )
}

/// Error settling an AR/AP open item.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The settlement amount exceeds the item's outstanding balance.
    #[error("settlement amount {amount} exceeds outstanding {outstanding}")]
    ExceedsOutstanding {
        /// Amount requested.
        amount: Decimal,
        /// Outstanding balance of the item.
        outstanding: Decimal,
    },
    /// The settlement amount is not positive.
    #[error("settlement amount must be positive: {0}")]
    NonPositiveAmount(Decimal),
}

fn settlement_voucher(
    item_id: String,
    amount: Decimal,
    outstanding: Decimal,
    cash_account: &str,
    control_account: &str,
    posting_date: NaiveDate,
    is_receivable: bool,
) -> Result<VoucherRequest, SettlementError> {
    if amount <= Decimal::ZERO {
        return Err(SettlementError::NonPositiveAmount(amount));
    }
    if amount > outstanding {
        return Err(SettlementError::ExceedsOutstanding { amount, outstanding });
    }

    let description = format!("Settlement of open item {item_id}");
    let (cash_debit, cash_credit, control_debit, control_credit) = if is_receivable {
        (amount, Decimal::ZERO, Decimal::ZERO, amount)
    } else {
        (Decimal::ZERO, amount, amount, Decimal::ZERO)
    };

    Ok(VoucherRequest {
        posting_date,
        description: description.clone(),
        entry_type: EntryKind::Normal,
        entries: vec![
            VoucherEntryRequest {
                account_code: cash_account.to_string(),
                description: Some(description.clone()),
                debit: cash_debit,
                credit: cash_credit,
                currency: None,
                fx_rate: None,
                foreign_debit: None,
                foreign_credit: None,
                dimensions: DimensionKey::none(),
            },
            VoucherEntryRequest {
                account_code: control_account.to_string(),
                description: Some(description),
                debit: control_debit,
                credit: control_credit,
                currency: None,
                fx_rate: None,
                foreign_debit: None,
                foreign_credit: None,
                dimensions: DimensionKey::none(),
            },
        ],
        source_template: None,
        source_event_id: None,
    })
}

/// Builds a provisioning (or, when `reverse` is true, reversal) voucher
/// for a computed bad-debt provision amount. `expense_account` is debited
/// (or credited on reversal) and `allowance_account` is the mirror leg.
/// Returns `None` when `amount` rounds to zero — no voucher is needed.
#[must_use]
pub fn build_provision_voucher(
    amount: Decimal,
    expense_account: &str,
    allowance_account: &str,
    posting_date: NaiveDate,
    period: &str,
    reverse: bool,
) -> Option<VoucherRequest> {
    if amount == Decimal::ZERO {
        return None;
    }
    let description = format!("Bad debt provision {period}");
    let (expense_debit, expense_credit, allowance_debit, allowance_credit) = if reverse {
        (Decimal::ZERO, amount, amount, Decimal::ZERO)
    } else {
        (amount, Decimal::ZERO, Decimal::ZERO, amount)
    };
    Some(VoucherRequest {
        posting_date,
        description: description.clone(),
        entry_type: EntryKind::Adjustment,
        entries: vec![
            VoucherEntryRequest {
                account_code: expense_account.to_string(),
                description: Some(description.clone()),
                debit: expense_debit,
                credit: expense_credit,
                currency: None,
                fx_rate: None,
                foreign_debit: None,
                foreign_credit: None,
                dimensions: DimensionKey::none(),
            },
            VoucherEntryRequest {
                account_code: allowance_account.to_string(),
                description: Some(description),
                debit: allowance_debit,
                credit: allowance_credit,
                currency: None,
                fx_rate: None,
                foreign_debit: None,
                foreign_credit: None,
                dimensions: DimensionKey::none(),
            },
        ],
        source_template: Some("BAD_DEBT_PROVISION".to_string()),
        source_event_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn aging_bucket_boundaries() {
        let invoice = date(2025, 1, 1);
        assert_eq!(AgingBucket::classify(invoice, date(2025, 1, 31)), AgingBucket::Days0To30);
        assert_eq!(AgingBucket::classify(invoice, date(2025, 2, 1)), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::classify(invoice, date(2025, 3, 2)), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::classify(invoice, date(2025, 4, 15)), AgingBucket::Over90);
    }

    #[test]
    fn aging_report_sums_to_total_outstanding() {
        let items = vec![
            (date(2025, 1, 1), dec!(100)),
            (date(2024, 10, 1), dec!(50)),
            (date(2025, 1, 20), dec!(25)),
        ];
        let report = AgingReport::build(&items, date(2025, 1, 25));
        assert_eq!(report.total(), dec!(175));
    }

    #[test]
    fn provision_applies_bucket_rates() {
        let mut buckets = std::collections::BTreeMap::new();
        buckets.insert(AgingBucket::Days0To30, dec!(1000));
        buckets.insert(AgingBucket::Over90, dec!(200));
        let report = AgingReport { buckets };
        let rates = ProvisionRates {
            days_0_30: dec!(0.01),
            days_31_60: dec!(0.05),
            days_61_90: dec!(0.20),
            over_90: dec!(0.50),
        };
        assert_eq!(compute_provision(&report, &rates), dec!(110.00));
    }

    #[test]
    fn settlement_voucher_balances_and_debits_cash() {
        let item = ArItem {
            id: ArItemId::new(),
            customer: DimensionValueId::none(),
            amount: dec!(1000),
            invoice_date: date(2025, 1, 1),
            outstanding: dec!(1000),
        };
        let voucher = settle_ar(&item, dec!(400), "1001", "1122", date(2025, 1, 15)).unwrap();
        let debit: Decimal = voucher.entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = voucher.entries.iter().map(|e| e.credit).sum();
        assert_eq!(debit, credit);
        assert_eq!(voucher.entries[0].debit, dec!(400));
        assert_eq!(voucher.entries[1].credit, dec!(400));
    }

    #[test]
    fn settlement_rejects_overpay() {
        let item = ArItem {
            id: ArItemId::new(),
            customer: DimensionValueId::none(),
            amount: dec!(1000),
            invoice_date: date(2025, 1, 1),
            outstanding: dec!(100),
        };
        let err = settle_ar(&item, dec!(400), "1001", "1122", date(2025, 1, 15)).unwrap_err();
        assert!(matches!(err, SettlementError::ExceedsOutstanding { .. }));
    }

    #[test]
    fn provision_reversal_swaps_sides() {
        let date = date(2025, 1, 31);
        let voucher = build_provision_voucher(dec!(50), "6200", "1129", date, "2025-01", true).unwrap();
        assert_eq!(voucher.entries[0].credit, dec!(50));
        assert_eq!(voucher.entries[1].debit, dec!(50));
    }

    #[test]
    fn zero_provision_produces_no_voucher() {
        let date = date(2025, 1, 31);
        assert!(build_provision_voucher(Decimal::ZERO, "6200", "1129", date, "2025-01", false).is_none());
    }
}
