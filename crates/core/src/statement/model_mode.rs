//! Model-mode five-step reconciliation (spec 4.5.2): Financing ->
//! Depreciation -> P&L -> Equity -> Reconcile, with fixed-point iteration
//! over the debt/interest/cash cycle (design note, spec 9; P9).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::round_money;

use super::driver::DriverRecord;
use super::error::ReconciliationWarning;

/// Default absolute tolerance for both the auto-adjustment threshold and
/// the convergence check (spec 4.5.2, 6). Callers running inside the
/// server normally take this from `LedgerConfig::convergence_tolerance`
/// instead; this constant is the pure-function default.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// One pass's fully computed output (spec 6's "Statement output shape
/// (model mode)"): the driver echoed back plus every computed field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// The driver record this result was computed from (echoed per spec
    /// 6's round-tripping requirement).
    pub driver: DriverRecord,

    /// Step 1 (Financing).
    pub interest: Decimal,
    /// Step 1.
    pub new_borrowing: Decimal,
    /// Step 1.
    pub closing_debt: Decimal,

    /// Step 2 (Depreciation).
    pub depreciation: Decimal,
    /// Step 2.
    pub closing_accum_depreciation: Decimal,
    /// Step 2.
    pub closing_fixed_asset_net: Decimal,

    /// Step 3 (P&L).
    pub gross_profit: Decimal,
    /// Step 3.
    pub ebit: Decimal,
    /// Step 3.
    pub ebt: Decimal,
    /// Step 3.
    pub tax: Decimal,
    /// Step 3.
    pub net_income: Decimal,

    /// Step 4 (Equity).
    pub retained_earnings_change: Decimal,
    /// Step 4.
    pub closing_retained: Decimal,
    /// Step 4.
    pub closing_equity_capital: Decimal,
    /// Step 4.
    pub closing_total_equity: Decimal,

    /// Step 5 (Reconcile).
    pub closing_cash: Decimal,
    /// Step 5.
    pub total_assets: Decimal,
    /// Step 5.
    pub total_liabilities: Decimal,
    /// Step 5.
    pub total_equity: Decimal,
    /// Step 5. Signed `total_assets - (total_liabilities + total_equity)`
    /// *after* `auto_adjustment` has been applied, so it should be ~0
    /// whenever `is_balanced` is true.
    pub balance_diff: Decimal,
    /// Step 5.
    pub is_balanced: bool,
    /// The single reconciliation adjustment applied to payable
    /// (positive) or receivable (negative), if any (spec 4.5.2 step 5,
    /// open question in spec 9: rounded half-away-from-zero).
    pub auto_adjustment: Option<Decimal>,
}

/// Internal carry between iterations: the previous pass's interest and
/// tax feed the next pass's cash-before-financing (spec 4.5.2 step 1),
/// and the previous pass's `new_borrowing` is what convergence is
/// measured against (P9).
#[derive(Debug, Clone, Copy, Default)]
struct Carry {
    interest: Decimal,
    tax: Decimal,
    new_borrowing: Decimal,
}

/// Runs the five steps once against `driver` and the given carry-in from
/// a prior pass (or [`Carry::default`] / `first_pass = true` for the very
/// first run).
fn run_steps(driver: &DriverRecord, carry_in: Carry, first_pass: bool, tolerance: Decimal) -> ReconciliationResult {
    // Step 1: Financing.
    // Model mode has no explicit "closing" receivable/payable distinct
    // from opening (spec 6 lists only opening_* driver fields), so the
    // within-period deltas the cash-before-financing formula references
    // are zero unless a caller threads them through `extra` and a future
    // revision adds dedicated fields.
    let delta_receivable = Decimal::ZERO;
    let delta_payable = Decimal::ZERO;

    let cash_before_financing = driver.opening_cash + (driver.revenue - delta_receivable)
        - (driver.cost + driver.other_expense + carry_in.interest + carry_in.tax + driver.capex - delta_payable
            + driver.repayment);

    let new_borrowing = if cash_before_financing < driver.min_cash {
        driver.min_cash - cash_before_financing
    } else {
        Decimal::ZERO
    };
    let closing_debt = driver.opening_debt + new_borrowing - driver.repayment;

    let interest_basis = if first_pass {
        driver.opening_debt
    } else {
        (driver.opening_debt + closing_debt) / Decimal::from(2)
    };
    let interest = round_money(interest_basis * driver.interest_rate);

    // Step 2: Depreciation.
    let depreciation = if driver.fixed_asset_life.is_zero() {
        Decimal::ZERO
    } else {
        round_money((driver.fixed_asset_cost - driver.fixed_asset_salvage) / driver.fixed_asset_life)
    };
    let closing_accum_depreciation = driver.accum_depreciation + depreciation;
    let closing_fixed_asset_net = driver.fixed_asset_cost + driver.capex - closing_accum_depreciation;

    // Step 3: P&L.
    let gross_profit = driver.revenue - driver.cost;
    let ebit = gross_profit - driver.other_expense - depreciation;
    let ebt = ebit - interest;
    let tax = round_money(ebt.max(Decimal::ZERO) * driver.tax_rate);
    let net_income = ebt - tax;

    // Step 4: Equity.
    let retained_earnings_change = net_income - driver.dividend;
    let closing_retained = driver.opening_retained + retained_earnings_change;
    let closing_equity_capital = driver.opening_equity + driver.new_equity;
    let closing_total_equity = closing_equity_capital + closing_retained;

    // Step 5: Reconcile.
    let closing_cash = cash_before_financing + new_borrowing;
    let total_assets_raw =
        closing_cash + driver.opening_receivable + driver.opening_inventory + closing_fixed_asset_net;
    let total_liabilities_raw = closing_debt + driver.opening_payable;
    let total_equity = closing_total_equity;

    let raw_diff = total_assets_raw - (total_liabilities_raw + total_equity);
    let (total_assets, total_liabilities, auto_adjustment, balance_diff) = if raw_diff.abs() < tolerance {
        (total_assets_raw, total_liabilities_raw, None, raw_diff)
    } else {
        // Single adjustment (spec 4.5.2 step 5, open question in spec 9):
        // round-half-away-from-zero, applied to payable when assets
        // exceed liabilities+equity, to receivable otherwise.
        let adjustment = round_money(raw_diff.abs());
        if raw_diff > Decimal::ZERO {
            let adjusted_liabilities = total_liabilities_raw + adjustment;
            (
                total_assets_raw,
                adjusted_liabilities,
                Some(adjustment),
                total_assets_raw - (adjusted_liabilities + total_equity),
            )
        } else {
            let adjusted_assets = total_assets_raw + adjustment;
            (
                adjusted_assets,
                total_liabilities_raw,
                Some(-adjustment),
                adjusted_assets - (total_liabilities_raw + total_equity),
            )
        }
    };
    let is_balanced = balance_diff.abs() < tolerance;

    ReconciliationResult {
        driver: driver.clone(),
        interest,
        new_borrowing,
        closing_debt,
        depreciation,
        closing_accum_depreciation,
        closing_fixed_asset_net,
        gross_profit,
        ebit,
        ebt,
        tax,
        net_income,
        retained_earnings_change,
        closing_retained,
        closing_equity_capital,
        closing_total_equity,
        closing_cash,
        total_assets,
        total_liabilities,
        total_equity,
        balance_diff,
        is_balanced,
        auto_adjustment,
    }
}

/// Runs the five steps exactly once, with no iteration (spec 4.5.2's
/// "one-shot" scenario 4): interest is computed against opening debt.
#[must_use]
pub fn run_once(driver: &DriverRecord) -> ReconciliationResult {
    run_steps(driver, Carry::default(), true, DEFAULT_TOLERANCE)
}

/// The outcome of an iterated run (spec 6: `iterations`,
/// `iteration_converged`, plus any [`ReconciliationWarning`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationOutcome {
    /// The final pass's result.
    pub result: ReconciliationResult,
    /// How many passes actually ran.
    pub iterations: u32,
    /// Whether both `|Δinterest|` and `|Δnew_borrowing|` fell under
    /// tolerance before the budget was exhausted.
    pub converged: bool,
    /// Non-fatal warning, present whenever `converged` is false.
    pub warning: Option<ReconciliationWarning>,
}

/// Re-runs the five steps up to `max_iterations` times, each pass feeding
/// its interest/tax forward as the next pass's carry (spec 4.5.2's
/// "Convergence loop"). Stops early once `|Δinterest| < tolerance` and
/// `|Δnew_borrowing| < tolerance` (spec default `tolerance = 0.01`).
#[must_use]
pub fn iterate(driver: &DriverRecord, max_iterations: u32, tolerance: Decimal) -> IterationOutcome {
    let mut carry = Carry::default();
    let mut result = run_steps(driver, carry, true, tolerance);
    let mut iterations = 1;
    let mut converged = false;

    if max_iterations > 1 {
        for pass in 2..=max_iterations {
            let prev_interest = result.interest;
            let prev_new_borrowing = result.new_borrowing;
            carry = Carry {
                interest: result.interest,
                tax: result.tax,
                new_borrowing: result.new_borrowing,
            };
            result = run_steps(driver, carry, false, tolerance);
            iterations = pass;

            let interest_delta = (result.interest - prev_interest).abs();
            let borrowing_delta = (result.new_borrowing - prev_new_borrowing).abs();
            if interest_delta < tolerance && borrowing_delta < tolerance {
                converged = true;
                break;
            }
        }
    } else {
        // A single-iteration request still satisfies convergence trivially
        // when there was nothing left to iterate against.
        converged = max_iterations <= 1 && driver.interest_rate.is_zero();
    }

    let warning = if converged {
        None
    } else if driver.interest_rate >= Decimal::ONE {
        Some(ReconciliationWarning::InterestRateNotContractive)
    } else {
        Some(ReconciliationWarning::BudgetExhausted { iterations })
    };

    IterationOutcome {
        result,
        iterations,
        converged,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario_4_driver() -> DriverRecord {
        let mut d = DriverRecord::new(dec!(20000), dec!(12000), dec!(5000));
        d.other_expense = dec!(2000);
        d.opening_debt = dec!(4000);
        d.opening_equity = dec!(6000);
        d.opening_retained = dec!(1000);
        d.fixed_asset_cost = dec!(10000);
        d.fixed_asset_life = dec!(5);
        d.interest_rate = dec!(0.05);
        d.tax_rate = dec!(0.25);
        d
    }

    #[test]
    fn one_shot_matches_scenario_4() {
        let driver = scenario_4_driver();
        let result = run_once(&driver);
        assert_eq!(result.depreciation, dec!(2000));
        assert_eq!(result.interest, dec!(200));
        assert_eq!(result.ebit, dec!(4000));
        assert_eq!(result.ebt, dec!(3800));
        assert_eq!(result.tax, dec!(950));
        assert_eq!(result.net_income, dec!(2850));
        assert!(result.is_balanced);
    }

    #[test]
    fn convergent_iteration_borrows_and_settles() {
        // scenario 4's driver generates enough organic cash that a
        // min_cash of 8000 never binds; push the floor high enough that
        // financing actually kicks in, and confirm the debt/interest/cash
        // loop settles to a fixed point within a generous budget.
        let mut driver = scenario_4_driver();
        driver.min_cash = dec!(15000);
        let outcome = iterate(&driver, 20, DEFAULT_TOLERANCE);
        assert!(outcome.result.new_borrowing > Decimal::ZERO);
        assert!(outcome.converged, "expected convergence within 20 iterations");
        // Interest ends up computed on average debt, not opening debt
        // alone, once borrowing kicks in.
        let opening_only_interest = round_money(driver.opening_debt * driver.interest_rate);
        assert_ne!(outcome.result.interest, opening_only_interest);
    }

    #[test]
    fn non_convergent_scenario_flags_diverged() {
        let mut driver = DriverRecord::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        driver.opening_debt = dec!(100);
        driver.interest_rate = dec!(1.0);
        driver.min_cash = dec!(1000);
        let outcome = iterate(&driver, 3, DEFAULT_TOLERANCE);
        assert!(!outcome.converged);
        assert_eq!(outcome.warning, Some(ReconciliationWarning::InterestRateNotContractive));
    }

    #[test]
    fn auto_adjustment_zeroes_balance_diff() {
        // A driver with no fixed assets/debt/equity at all still balances
        // via the receivable/payable adjustment when revenue accrues
        // without a matching cash or equity movement being modeled.
        let driver = DriverRecord::new(dec!(100), dec!(0), dec!(0));
        let result = run_once(&driver);
        assert!(result.is_balanced);
    }
}
