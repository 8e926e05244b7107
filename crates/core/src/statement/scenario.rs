//! Scenario sub-mode (spec 4.5.2): re-runs the model-mode calculation for
//! each value of a swept driver field, in parallel (grounded on the
//! reference workspace's `SimulationEngine::run`, which fans out one
//! `par_iter` pass per swept point).

use rust_decimal::Decimal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::driver::DriverRecord;
use super::error::StatementError;
use super::model_mode::{iterate, IterationOutcome};

/// One point of a scenario sweep: the swept value and the outcome it
/// produced.
#[derive(Debug, Clone)]
pub struct ScenarioPoint {
    /// The value substituted for the swept field.
    pub value: Decimal,
    /// The iterated reconciliation outcome at that value.
    pub outcome: IterationOutcome,
}

/// Serializable projection of a [`ScenarioPoint`], keyed by the swept
/// field's value, for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRow {
    /// The swept value.
    pub value: Decimal,
    /// Net income at this point.
    pub net_income: Decimal,
    /// Closing cash at this point.
    pub closing_cash: Decimal,
    /// Whether this point balanced.
    pub is_balanced: bool,
    /// Whether the iteration converged at this point.
    pub iteration_converged: bool,
}

impl From<&ScenarioPoint> for ScenarioRow {
    fn from(point: &ScenarioPoint) -> Self {
        Self {
            value: point.value,
            net_income: point.outcome.result.net_income,
            closing_cash: point.outcome.result.closing_cash,
            is_balanced: point.outcome.result.is_balanced,
            iteration_converged: point.outcome.converged,
        }
    }
}

/// Runs the iterated reconciliation once per value in `values`, sweeping
/// `field` on the base driver, in parallel across the swept values (each
/// run is independent: no shared mutable ledger state, so this is the one
/// place spec 5's "no internal parallelism" is deliberately relaxed).
///
/// # Errors
///
/// Returns [`StatementError::UnknownField`] if `field` is not a
/// recognized driver field.
pub fn scenario_sweep(
    base: &DriverRecord,
    field: &str,
    values: &[Decimal],
    max_iterations: u32,
    tolerance: Decimal,
) -> Result<Vec<ScenarioPoint>, StatementError> {
    // Validate the field name once, up front, so a typo fails fast
    // instead of after fanning out `values.len()` parallel runs.
    base.with_field(field, Decimal::ZERO)
        .map_err(StatementError::UnknownField)?;

    let points: Vec<ScenarioPoint> = values
        .par_iter()
        .map(|&value| {
            let driver = base
                .with_field(field, value)
                .expect("field validated above");
            let outcome = iterate(&driver, max_iterations, tolerance);
            ScenarioPoint { value, outcome }
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::model_mode::DEFAULT_TOLERANCE;
    use rust_decimal_macros::dec;

    #[test]
    fn sweeps_revenue_and_preserves_order() {
        let base = DriverRecord::new(dec!(10000), dec!(6000), dec!(1000));
        let values = vec![dec!(5000), dec!(10000), dec!(15000)];
        let points = scenario_sweep(&base, "revenue", &values, 5, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, dec!(5000));
        assert_eq!(points[2].value, dec!(15000));
        // Higher revenue -> higher net income, holding cost fixed.
        assert!(points[2].outcome.result.net_income > points[0].outcome.result.net_income);
    }

    #[test]
    fn unknown_field_fails_fast() {
        let base = DriverRecord::new(dec!(1), dec!(1), dec!(1));
        let result = scenario_sweep(&base, "not_a_field", &[dec!(1)], 1, DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(StatementError::UnknownField(_))));
    }
}
