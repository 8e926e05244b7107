//! Fixed-asset sub-ledger (spec 4.4): per-asset depreciation, impairment,
//! and construction-in-progress (CIP) transfer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::{round_money, CipProjectId, FixedAssetId};

use crate::coa::DimensionKey;
use crate::ledger::types::{EntryKind, VoucherEntryRequest, VoucherRequest};

/// Depreciation method an asset card uses (spec 4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    /// `(cost - salvage) / life`, spread evenly.
    StraightLine,
    /// `book_value * (2 / life)` each period, floored at salvage.
    DoubleDeclining,
    /// Sum-of-years-digits: front-loaded depreciation weighted by
    /// remaining useful life.
    SumOfYears,
}

/// A fixed-asset card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedAsset {
    /// Unique identifier.
    pub id: FixedAssetId,
    /// Asset account code this asset's cost is carried under.
    pub asset_account: String,
    /// Accumulated-depreciation contra-account code.
    pub accum_depreciation_account: String,
    /// Original cost (historical, never restated except by impairment).
    pub original_cost: Decimal,
    /// Accumulated depreciation recorded to date.
    pub accumulated_depreciation: Decimal,
    /// Accumulated impairment losses recorded to date, tracked separately
    /// from depreciation so a reversal never exceeds what was impaired.
    pub accumulated_impairment: Decimal,
    /// Useful life, in whole years.
    pub useful_life_years: u32,
    /// Number of full years already elapsed since `in_service_date`, used
    /// by sum-of-years-digits to find the current year's digit.
    pub years_elapsed: u32,
    /// Residual value at the end of useful life.
    pub salvage_value: Decimal,
    /// Depreciation method.
    pub method: DepreciationMethod,
    /// Date the asset entered service.
    pub in_service_date: NaiveDate,
}

impl FixedAsset {
    /// Current net book value: `cost - accumulated_depreciation -
    /// accumulated_impairment`.
    #[must_use]
    pub fn book_value(&self) -> Decimal {
        self.original_cost - self.accumulated_depreciation - self.accumulated_impairment
    }

    /// Depreciable base remaining after impairment: the salvage floor
    /// depreciation may not cross.
    fn floor(&self) -> Decimal {
        self.salvage_value
    }

    /// Computes this month's depreciation expense. Returns zero once the
    /// asset is fully depreciated down to salvage, or if `useful_life_years`
    /// is zero (depreciation disabled, spec 6's driver-record convention).
    #[must_use]
    pub fn monthly_depreciation(&self) -> Decimal {
        if self.useful_life_years == 0 {
            return Decimal::ZERO;
        }
        let remaining = self.book_value() - self.floor();
        if remaining <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let life = Decimal::from(self.useful_life_years);
        let annual = match self.method {
            DepreciationMethod::StraightLine => {
                (self.original_cost - self.salvage_value) / life
            }
            DepreciationMethod::DoubleDeclining => {
                let rate = Decimal::TWO / life;
                self.book_value() * rate
            }
            DepreciationMethod::SumOfYears => {
                let digits_sum = life * (life + Decimal::ONE) / Decimal::TWO;
                let years_remaining = life - Decimal::from(self.years_elapsed);
                if years_remaining <= Decimal::ZERO || digits_sum.is_zero() {
                    Decimal::ZERO
                } else {
                    (self.original_cost - self.salvage_value) * years_remaining / digits_sum
                }
            }
        };

        let monthly = round_money(annual / Decimal::from(12u32));
        monthly.min(remaining)
    }

    /// Applies one month of depreciation, advancing `accumulated_depreciation`.
    pub fn apply_depreciation(&mut self, amount: Decimal) {
        self.accumulated_depreciation += amount;
    }
}

/// Builds a balanced monthly-depreciation voucher for a set of assets:
/// debits a single depreciation-expense account, credits each asset's own
/// accumulated-depreciation account (spec 4.4: "Monthly depreciation emits
/// a voucher"). Assets whose `monthly_depreciation()` rounds to zero are
/// skipped. Returns `None` if every asset's depreciation is zero.
#[must_use]
pub fn build_depreciation_voucher(
    assets: &[&FixedAsset],
    depreciation_expense_account: &str,
    posting_date: NaiveDate,
    period: &str,
) -> Option<VoucherRequest> {
    let mut entries = Vec::new();
    let mut total = Decimal::ZERO;
    for asset in assets {
        let amount = asset.monthly_depreciation();
        if amount.is_zero() {
            continue;
        }
        total += amount;
        entries.push(VoucherEntryRequest {
            account_code: asset.accum_depreciation_account.clone(),
            description: Some(format!("Depreciation {period}")),
            debit: Decimal::ZERO,
            credit: amount,
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        });
    }
    if entries.is_empty() {
        return None;
    }
    entries.insert(
        0,
        VoucherEntryRequest {
            account_code: depreciation_expense_account.to_string(),
            description: Some(format!("Depreciation {period}")),
            debit: total,
            credit: Decimal::ZERO,
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        },
    );

    Some(VoucherRequest {
        posting_date,
        description: format!("Monthly depreciation {period}"),
        entry_type: EntryKind::Normal,
        entries,
        source_template: Some("MONTHLY_DEPRECIATION".to_string()),
        source_event_id: None,
    })
}

/// Outcome of an impairment test: the loss to record, if any.
#[derive(Debug, Clone, Copy)]
pub struct ImpairmentResult {
    /// `book_value - recoverable_amount`, floored at zero (a gain is not
    /// recognized by an impairment test — only [`impairment_reversal`]
    /// recognizes a recovery, and only up to the amount previously
    /// impaired).
    pub loss: Decimal,
}

/// Tests an asset for impairment against a recoverable amount. Returns
/// `None` if the asset is not impaired (`book_value <= recoverable_amount`).
#[must_use]
pub fn impairment_test(asset: &FixedAsset, recoverable_amount: Decimal) -> Option<ImpairmentResult> {
    let loss = round_money(asset.book_value() - recoverable_amount);
    if loss <= Decimal::ZERO {
        return None;
    }
    Some(ImpairmentResult { loss })
}

/// The amount by which a prior impairment may be reversed: capped at
/// `asset.accumulated_impairment`, since a reversal can never restore the
/// asset above what it would have been without the impairment (spec 4.4).
#[must_use]
pub fn impairment_reversal_amount(asset: &FixedAsset, recovered_amount: Decimal) -> Decimal {
    let indicated = round_money(recovered_amount - asset.book_value());
    indicated.clamp(Decimal::ZERO, asset.accumulated_impairment)
}

/// Builds the impairment-loss (or, if `amount` was produced by
/// [`impairment_reversal_amount`], reversal) voucher for one asset.
/// `accumulated_impairment` is credited (or debited, on reversal) and
/// `impairment_account` is the mirror leg. Returns `None` if `amount` is
/// not positive.
#[must_use]
pub fn build_impairment_voucher(
    asset: &FixedAsset,
    amount: Decimal,
    impairment_expense_account: &str,
    posting_date: NaiveDate,
    reverse: bool,
) -> Option<VoucherRequest> {
    if amount <= Decimal::ZERO {
        return None;
    }
    let description = if reverse {
        format!("Impairment reversal for {}", asset.id)
    } else {
        format!("Impairment loss for {}", asset.id)
    };
    let (expense_debit, expense_credit, asset_debit, asset_credit) = if reverse {
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
                account_code: impairment_expense_account.to_string(),
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
                account_code: asset.accum_depreciation_account.clone(),
                description: Some(description),
                debit: asset_debit,
                credit: asset_credit,
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

/// A construction-in-progress project accumulating cost before transfer to
/// a fixed asset (spec 4.4's CIP support).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipProject {
    /// Unique identifier.
    pub id: CipProjectId,
    /// CIP account code the accumulated cost is carried under.
    pub cip_account: String,
    /// Total cost accumulated so far.
    pub accumulated_cost: Decimal,
}

/// Builds a voucher transferring `amount` of a CIP project's accumulated
/// cost into a fixed-asset account. `amount` may be a partial or the full
/// remaining balance (spec 4.4: "support partial and full transfers").
///
/// # Errors
///
/// Returns `Err` with the project's current accumulated cost if `amount`
/// exceeds it.
pub fn build_cip_transfer_voucher(
    project: &CipProject,
    amount: Decimal,
    target_fixed_asset_account: &str,
    posting_date: NaiveDate,
) -> Result<VoucherRequest, Decimal> {
    if amount > project.accumulated_cost {
        return Err(project.accumulated_cost);
    }
    let description = format!("CIP transfer from project {}", project.id);
    Ok(VoucherRequest {
        posting_date,
        description: description.clone(),
        entry_type: EntryKind::Normal,
        entries: vec![
            VoucherEntryRequest {
                account_code: target_fixed_asset_account.to_string(),
                description: Some(description.clone()),
                debit: amount,
                credit: Decimal::ZERO,
                currency: None,
                fx_rate: None,
                foreign_debit: None,
                foreign_credit: None,
                dimensions: DimensionKey::none(),
            },
            VoucherEntryRequest {
                account_code: project.cip_account.clone(),
                description: Some(description),
                debit: Decimal::ZERO,
                credit: amount,
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset(method: DepreciationMethod) -> FixedAsset {
        FixedAsset {
            id: FixedAssetId::new(),
            asset_account: "1510".into(),
            accum_depreciation_account: "1519".into(),
            original_cost: dec!(12000),
            accumulated_depreciation: Decimal::ZERO,
            accumulated_impairment: Decimal::ZERO,
            useful_life_years: 5,
            years_elapsed: 0,
            salvage_value: Decimal::ZERO,
            method,
            in_service_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn straight_line_monthly_depreciation() {
        let a = asset(DepreciationMethod::StraightLine);
        // (12000 - 0) / 5 years / 12 months = 200
        assert_eq!(a.monthly_depreciation(), dec!(200.00));
    }

    #[test]
    fn double_declining_uses_book_value() {
        let mut a = asset(DepreciationMethod::DoubleDeclining);
        // rate = 2/5 = 0.4 annual; monthly = 12000*0.4/12 = 400
        assert_eq!(a.monthly_depreciation(), dec!(400.00));
        a.apply_depreciation(a.monthly_depreciation());
        // book value now 11600; monthly = 11600*0.4/12 = 386.666... -> 386.67
        assert_eq!(a.monthly_depreciation(), dec!(386.67));
    }

    #[test]
    fn sum_of_years_front_loads() {
        let a = asset(DepreciationMethod::SumOfYears);
        // digits sum = 5*6/2=15; year 1 remaining = 5; annual = 12000*5/15=4000; monthly=333.33
        assert_eq!(a.monthly_depreciation(), dec!(333.33));
    }

    #[test]
    fn depreciation_never_crosses_salvage_floor() {
        let mut a = asset(DepreciationMethod::StraightLine);
        a.salvage_value = dec!(11900);
        a.accumulated_depreciation = dec!(50);
        // remaining to floor = 12000 - 50 - 11900 = 50, less than the 18.33 monthly rate
        assert!(a.monthly_depreciation() <= dec!(50));
    }

    #[test]
    fn depreciation_voucher_balances() {
        let a = asset(DepreciationMethod::StraightLine);
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let voucher = build_depreciation_voucher(&[&a], "6100", date, "2025-01").unwrap();
        let debit: Decimal = voucher.entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = voucher.entries.iter().map(|e| e.credit).sum();
        assert_eq!(debit, credit);
        assert_eq!(debit, dec!(200.00));
    }

    #[test]
    fn impairment_test_detects_loss() {
        let mut a = asset(DepreciationMethod::StraightLine);
        a.accumulated_depreciation = dec!(2000);
        // book value = 10000; recoverable = 7000 -> loss 3000
        let result = impairment_test(&a, dec!(7000)).unwrap();
        assert_eq!(result.loss, dec!(3000));
    }

    #[test]
    fn impairment_reversal_capped_at_prior_impairment() {
        let mut a = asset(DepreciationMethod::StraightLine);
        a.accumulated_depreciation = dec!(2000);
        a.accumulated_impairment = dec!(1000);
        // book value = 12000-2000-1000 = 9000; recovered to 11000 implies 2000 reversal,
        // but capped at the 1000 actually impaired.
        assert_eq!(impairment_reversal_amount(&a, dec!(11000)), dec!(1000));
    }

    #[test]
    fn cip_transfer_rejects_amount_exceeding_balance() {
        let project = CipProject {
            id: CipProjectId::new(),
            cip_account: "1601".into(),
            accumulated_cost: dec!(5000),
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let err = build_cip_transfer_voucher(&project, dec!(6000), "1510", date).unwrap_err();
        assert_eq!(err, dec!(5000));
    }

    #[test]
    fn cip_partial_transfer_balances() {
        let project = CipProject {
            id: CipProjectId::new(),
            cip_account: "1601".into(),
            accumulated_cost: dec!(5000),
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let voucher = build_cip_transfer_voucher(&project, dec!(2000), "1510", date).unwrap();
        let debit: Decimal = voucher.entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = voucher.entries.iter().map(|e| e.credit).sum();
        assert_eq!(debit, credit);
        assert_eq!(debit, dec!(2000));
    }
}
