//! Diagnose sub-mode (spec 4.5.2): for each balance-sheet line, pairs its
//! period delta with the matching cash-flow component and reports any
//! delta larger than tolerance that has no matching component
//! ("delta-method reconciliation", glossary).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ledger_mode::{CashFlowStatement, StatementLines};

/// One balance-sheet line's delta, paired with the cash-flow component
/// that is supposed to explain it (if the mapping names one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaRow {
    /// Balance-sheet line name.
    pub line: String,
    /// `closing - opening` for this line across the two periods.
    pub delta: Decimal,
    /// Name of the cash-flow-statement line expected to offset this
    /// delta, if the caller supplied one via `component_names`.
    pub matched_component: Option<String>,
    /// The matched component's value, if found.
    pub matched_value: Option<Decimal>,
    /// `delta - matched_value` (or just `delta` when no match exists).
    /// Flagged when its absolute value exceeds tolerance.
    pub unexplained: Decimal,
    /// Human-readable cause, filled in only when `unexplained` exceeds
    /// tolerance.
    pub cause: Option<String>,
}

/// A full diagnostic run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// One row per balance-sheet line present in either period.
    pub rows: Vec<DeltaRow>,
    /// Whether every row's `unexplained` value is within tolerance.
    pub all_explained: bool,
}

/// Runs the diagnose sub-mode.
///
/// `component_names` maps a balance-sheet line name to the cash-flow
/// component name expected to explain its delta (e.g. `"receivable" ->
/// "delta_receivable"`); a line with no entry is reported unmatched.
#[must_use]
pub fn diagnose(
    prior_balance_sheet: &StatementLines,
    current_balance_sheet: &StatementLines,
    cash_flow: &CashFlowStatement,
    component_names: &BTreeMap<String, String>,
    tolerance: Decimal,
) -> DiagnosticReport {
    let mut names: Vec<&String> = prior_balance_sheet.keys().chain(current_balance_sheet.keys()).collect();
    names.sort();
    names.dedup();

    let all_components: BTreeMap<&String, Decimal> = cash_flow
        .operating
        .iter()
        .chain(cash_flow.investing.iter())
        .chain(cash_flow.financing.iter())
        .collect();

    let mut rows = Vec::with_capacity(names.len());
    let mut all_explained = true;

    for name in names {
        let opening = prior_balance_sheet.get(name).copied().unwrap_or(Decimal::ZERO);
        let closing = current_balance_sheet.get(name).copied().unwrap_or(Decimal::ZERO);
        let delta = closing - opening;

        let matched = component_names.get(name).and_then(|component_name| {
            all_components
                .get(component_name)
                .map(|value| (component_name.clone(), *value))
        });

        let unexplained = match &matched {
            Some((_, value)) => delta - value,
            None => delta,
        };

        let cause = if unexplained.abs() > tolerance {
            all_explained = false;
            Some(match &matched {
                Some((component, value)) => format!(
                    "{name} moved by {delta} but matched cash-flow component {component} only accounts for {value}"
                ),
                None => format!("{name} moved by {delta} with no matching cash-flow component configured"),
            })
        } else {
            None
        };

        rows.push(DeltaRow {
            line: name.clone(),
            delta,
            matched_component: matched.as_ref().map(|(c, _)| c.clone()),
            matched_value: matched.as_ref().map(|(_, v)| *v),
            unexplained,
            cause,
        });
    }

    DiagnosticReport { rows, all_explained }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn matched_delta_is_not_flagged() {
        let mut prior = StatementLines::new();
        prior.insert("payable".to_string(), dec!(1000));
        let mut current = StatementLines::new();
        current.insert("payable".to_string(), dec!(1200));

        let mut operating = StatementLines::new();
        // `delta_payable` is an additive component (spec 4.5.1), so a
        // line that perfectly explains its balance-sheet delta stores
        // the same signed value.
        operating.insert("delta_payable".to_string(), dec!(200));
        let cash_flow = CashFlowStatement {
            operating,
            investing: StatementLines::new(),
            financing: StatementLines::new(),
            operating_total: dec!(200),
            investing_total: Decimal::ZERO,
            financing_total: Decimal::ZERO,
        };

        let mut names = BTreeMap::new();
        names.insert("payable".to_string(), "delta_payable".to_string());

        let report = diagnose(&prior, &current, &cash_flow, &names, dec!(0.01));
        let row = &report.rows[0];
        assert_eq!(row.delta, dec!(200));
        assert_eq!(row.unexplained, Decimal::ZERO);
        assert!(row.cause.is_none());
        assert!(report.all_explained);
    }

    #[test]
    fn unmatched_delta_is_flagged() {
        let mut prior = StatementLines::new();
        prior.insert("mystery".to_string(), dec!(0));
        let mut current = StatementLines::new();
        current.insert("mystery".to_string(), dec!(500));

        let cash_flow = CashFlowStatement {
            operating: StatementLines::new(),
            investing: StatementLines::new(),
            financing: StatementLines::new(),
            operating_total: Decimal::ZERO,
            investing_total: Decimal::ZERO,
            financing_total: Decimal::ZERO,
        };

        let report = diagnose(&prior, &current, &cash_flow, &BTreeMap::new(), dec!(0.01));
        assert!(!report.all_explained);
        assert!(report.rows[0].cause.is_some());
    }
}
