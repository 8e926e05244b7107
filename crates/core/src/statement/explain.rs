//! Explain sub-mode (spec 4.5.2): given a computed field name, returns a
//! tree of its formula, the input values, and a recursive explanation of
//! each input down to the driver's leaf fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::driver::DriverRecord;
use super::error::StatementError;
use super::model_mode::ReconciliationResult;

/// One node of an explanation tree: a field's formula, its value, and the
/// (already-explained) inputs that formula consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainNode {
    /// The field being explained.
    pub field: String,
    /// The formula, in the same notation as spec 4.5.2.
    pub formula: String,
    /// The field's computed (or, for a leaf, driver-supplied) value.
    pub value: Decimal,
    /// Recursive explanations of each input the formula consumed. Empty
    /// for a leaf (a raw driver field).
    pub inputs: Vec<ExplainNode>,
}

fn leaf(field: &str, value: Decimal) -> ExplainNode {
    ExplainNode {
        field: field.to_string(),
        formula: format!("{field} (driver input)"),
        value,
        inputs: Vec::new(),
    }
}

/// Builds the explanation tree for one computed field.
///
/// # Errors
///
/// Returns [`StatementError::NotExplainable`] if `field` is not one of
/// the fields this function knows a formula for.
pub fn explain(result: &ReconciliationResult, field: &str) -> Result<ExplainNode, StatementError> {
    let driver: &DriverRecord = &result.driver;

    Ok(match field {
        "gross_profit" => ExplainNode {
            field: field.to_string(),
            formula: "revenue - cost".to_string(),
            value: result.gross_profit,
            inputs: vec![leaf("revenue", driver.revenue), leaf("cost", driver.cost)],
        },
        "depreciation" => ExplainNode {
            field: field.to_string(),
            formula: "(fixed_asset_cost - fixed_asset_salvage) / fixed_asset_life".to_string(),
            value: result.depreciation,
            inputs: vec![
                leaf("fixed_asset_cost", driver.fixed_asset_cost),
                leaf("fixed_asset_salvage", driver.fixed_asset_salvage),
                leaf("fixed_asset_life", driver.fixed_asset_life),
            ],
        },
        "interest" => ExplainNode {
            field: field.to_string(),
            formula: "average(opening_debt, closing_debt) * interest_rate (opening_debt alone on the first pass)"
                .to_string(),
            value: result.interest,
            inputs: vec![
                leaf("opening_debt", driver.opening_debt),
                leaf("closing_debt", result.closing_debt),
                leaf("interest_rate", driver.interest_rate),
            ],
        },
        "ebit" => ExplainNode {
            field: field.to_string(),
            formula: "gross_profit - other_expense - depreciation".to_string(),
            value: result.ebit,
            inputs: vec![
                explain(result, "gross_profit")?,
                leaf("other_expense", driver.other_expense),
                explain(result, "depreciation")?,
            ],
        },
        "ebt" => ExplainNode {
            field: field.to_string(),
            formula: "ebit - interest".to_string(),
            value: result.ebt,
            inputs: vec![explain(result, "ebit")?, explain(result, "interest")?],
        },
        "tax" => ExplainNode {
            field: field.to_string(),
            formula: "max(ebt, 0) * tax_rate".to_string(),
            value: result.tax,
            inputs: vec![explain(result, "ebt")?, leaf("tax_rate", driver.tax_rate)],
        },
        "net_income" => ExplainNode {
            field: field.to_string(),
            formula: "ebt - tax".to_string(),
            value: result.net_income,
            inputs: vec![explain(result, "ebt")?, explain(result, "tax")?],
        },
        "closing_retained" => ExplainNode {
            field: field.to_string(),
            formula: "opening_retained + net_income - dividend".to_string(),
            value: result.closing_retained,
            inputs: vec![
                leaf("opening_retained", driver.opening_retained),
                explain(result, "net_income")?,
                leaf("dividend", driver.dividend),
            ],
        },
        "closing_total_equity" => ExplainNode {
            field: field.to_string(),
            formula: "(opening_equity + new_equity) + closing_retained".to_string(),
            value: result.closing_total_equity,
            inputs: vec![
                leaf("opening_equity", driver.opening_equity),
                leaf("new_equity", driver.new_equity),
                explain(result, "closing_retained")?,
            ],
        },
        "new_borrowing" => ExplainNode {
            field: field.to_string(),
            formula: "min_cash > cash_before_financing ? min_cash - cash_before_financing : 0".to_string(),
            value: result.new_borrowing,
            inputs: vec![
                leaf("min_cash", driver.min_cash),
                leaf("opening_cash", driver.opening_cash),
                leaf("revenue", driver.revenue),
                leaf("cost", driver.cost),
            ],
        },
        "closing_cash" => ExplainNode {
            field: field.to_string(),
            formula: "cash_before_financing + new_borrowing".to_string(),
            value: result.closing_cash,
            inputs: vec![explain(result, "new_borrowing")?, leaf("opening_cash", driver.opening_cash)],
        },
        "total_assets" => ExplainNode {
            field: field.to_string(),
            formula: "closing_cash + opening_receivable + opening_inventory + closing_fixed_asset_net".to_string(),
            value: result.total_assets,
            inputs: vec![
                explain(result, "closing_cash")?,
                leaf("opening_receivable", driver.opening_receivable),
                leaf("opening_inventory", driver.opening_inventory),
                leaf("closing_fixed_asset_net", result.closing_fixed_asset_net),
            ],
        },
        "total_liabilities" => ExplainNode {
            field: field.to_string(),
            formula: "closing_debt + opening_payable (+ auto_adjustment when applied to payable)".to_string(),
            value: result.total_liabilities,
            inputs: vec![
                leaf("closing_debt", result.closing_debt),
                leaf("opening_payable", driver.opening_payable),
            ],
        },
        other => return Err(StatementError::NotExplainable(other.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::model_mode::run_once;
    use rust_decimal_macros::dec;

    #[test]
    fn explains_net_income_recursively() {
        let mut driver = DriverRecord::new(dec!(20000), dec!(12000), dec!(5000));
        driver.other_expense = dec!(2000);
        driver.opening_debt = dec!(4000);
        driver.fixed_asset_cost = dec!(10000);
        driver.fixed_asset_life = dec!(5);
        driver.interest_rate = dec!(0.05);
        driver.tax_rate = dec!(0.25);
        let result = run_once(&driver);

        let tree = explain(&result, "net_income").unwrap();
        assert_eq!(tree.value, dec!(2850));
        assert_eq!(tree.inputs.len(), 2);
        let ebt_node = &tree.inputs[0];
        assert_eq!(ebt_node.field, "ebt");
        assert_eq!(ebt_node.value, dec!(3800));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let driver = DriverRecord::new(dec!(1), dec!(1), dec!(1));
        let result = run_once(&driver);
        assert!(matches!(explain(&result, "not_a_field"), Err(StatementError::NotExplainable(_))));
    }
}
