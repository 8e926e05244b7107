//! The model-mode driver record (spec 6): the set of assumptions the
//! five-step reconciliation loop consumes. Required fields have no
//! default; every other field defaults as spec 6 specifies so a caller
//! may submit a partial record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn zero() -> Decimal {
    Decimal::ZERO
}

/// Driver assumptions for one period's model-mode run (spec 4.5.2, 6).
///
/// `extra` retains any fields the caller submitted that are not part of
/// this record, so they round-trip unchanged into the output (spec 6:
/// "Extra fields are retained unchanged in the output for
/// round-tripping.").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRecord {
    /// Required: period revenue.
    pub revenue: Decimal,
    /// Required: period cost of goods/services sold.
    pub cost: Decimal,
    /// Required: cash balance at the start of the period.
    pub opening_cash: Decimal,

    /// Operating expense outside cost of sales.
    #[serde(default = "zero")]
    pub other_expense: Decimal,
    /// Interest-bearing debt outstanding at period start.
    #[serde(default = "zero")]
    pub opening_debt: Decimal,
    /// Contributed-capital equity at period start.
    #[serde(default = "zero")]
    pub opening_equity: Decimal,
    /// Retained earnings at period start.
    #[serde(default = "zero")]
    pub opening_retained: Decimal,
    /// Accounts receivable at period start.
    #[serde(default = "zero")]
    pub opening_receivable: Decimal,
    /// Accounts payable at period start.
    #[serde(default = "zero")]
    pub opening_payable: Decimal,
    /// Inventory at period start.
    #[serde(default = "zero")]
    pub opening_inventory: Decimal,
    /// Gross fixed-asset cost at period start.
    #[serde(default = "zero")]
    pub fixed_asset_cost: Decimal,
    /// Accumulated depreciation at period start.
    #[serde(default = "zero")]
    pub accum_depreciation: Decimal,
    /// Useful life in periods; `0` disables depreciation.
    #[serde(default = "zero")]
    pub fixed_asset_life: Decimal,
    /// Salvage value at end of useful life.
    #[serde(default = "zero")]
    pub fixed_asset_salvage: Decimal,
    /// Period interest rate on debt.
    #[serde(default = "zero")]
    pub interest_rate: Decimal,
    /// Statutory tax rate applied to positive pre-tax income.
    #[serde(default = "zero")]
    pub tax_rate: Decimal,
    /// Dividend declared for the period.
    #[serde(default = "zero")]
    pub dividend: Decimal,
    /// Capital expenditure during the period.
    #[serde(default = "zero")]
    pub capex: Decimal,
    /// Minimum cash balance the financing step defends.
    #[serde(default = "zero")]
    pub min_cash: Decimal,
    /// New equity issued during the period.
    #[serde(default = "zero")]
    pub new_equity: Decimal,
    /// Scheduled debt repayment during the period.
    #[serde(default = "zero")]
    pub repayment: Decimal,

    /// Forward-compatible extra fields, retained verbatim (spec 9's
    /// "dict-shaped payloads" note: an explicit extension map, not
    /// attribute-name magic).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DriverRecord {
    /// A driver record with only the three required fields set and every
    /// optional field at its spec-6 default.
    #[must_use]
    pub fn new(revenue: Decimal, cost: Decimal, opening_cash: Decimal) -> Self {
        Self {
            revenue,
            cost,
            opening_cash,
            other_expense: Decimal::ZERO,
            opening_debt: Decimal::ZERO,
            opening_equity: Decimal::ZERO,
            opening_retained: Decimal::ZERO,
            opening_receivable: Decimal::ZERO,
            opening_payable: Decimal::ZERO,
            opening_inventory: Decimal::ZERO,
            fixed_asset_cost: Decimal::ZERO,
            accum_depreciation: Decimal::ZERO,
            fixed_asset_life: Decimal::ZERO,
            fixed_asset_salvage: Decimal::ZERO,
            interest_rate: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            dividend: Decimal::ZERO,
            capex: Decimal::ZERO,
            min_cash: Decimal::ZERO,
            new_equity: Decimal::ZERO,
            repayment: Decimal::ZERO,
            extra: BTreeMap::new(),
        }
    }

    /// Returns a copy with one named field overridden, for the
    /// [`super::scenario`] sweep. Recognizes every field in this record
    /// except `extra`.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the field name if it is not recognized.
    pub fn with_field(&self, field: &str, value: Decimal) -> Result<Self, String> {
        let mut out = self.clone();
        match field {
            "revenue" => out.revenue = value,
            "cost" => out.cost = value,
            "opening_cash" => out.opening_cash = value,
            "other_expense" => out.other_expense = value,
            "opening_debt" => out.opening_debt = value,
            "opening_equity" => out.opening_equity = value,
            "opening_retained" => out.opening_retained = value,
            "opening_receivable" => out.opening_receivable = value,
            "opening_payable" => out.opening_payable = value,
            "opening_inventory" => out.opening_inventory = value,
            "fixed_asset_cost" => out.fixed_asset_cost = value,
            "accum_depreciation" => out.accum_depreciation = value,
            "fixed_asset_life" => out.fixed_asset_life = value,
            "fixed_asset_salvage" => out.fixed_asset_salvage = value,
            "interest_rate" => out.interest_rate = value,
            "tax_rate" => out.tax_rate = value,
            "dividend" => out.dividend = value,
            "capex" => out.capex = value,
            "min_cash" => out.min_cash = value,
            "new_equity" => out.new_equity = value,
            "repayment" => out.repayment = value,
            other => return Err(other.to_string()),
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"revenue": 20000, "cost": 12000, "opening_cash": 5000}"#;
        let driver: DriverRecord = serde_json::from_str(json).unwrap();
        assert_eq!(driver.revenue, dec!(20000));
        assert_eq!(driver.other_expense, Decimal::ZERO);
        assert_eq!(driver.tax_rate, Decimal::ZERO);
    }

    #[test]
    fn extra_fields_round_trip() {
        let json = r#"{"revenue": 1, "cost": 1, "opening_cash": 1, "notes": "q1 forecast"}"#;
        let driver: DriverRecord = serde_json::from_str(json).unwrap();
        assert_eq!(driver.extra.get("notes").unwrap(), "q1 forecast");
        let back = serde_json::to_value(&driver).unwrap();
        assert_eq!(back["notes"], "q1 forecast");
    }

    #[test]
    fn with_field_overrides_named_field() {
        let driver = DriverRecord::new(dec!(1), dec!(1), dec!(1));
        let updated = driver.with_field("min_cash", dec!(8000)).unwrap();
        assert_eq!(updated.min_cash, dec!(8000));
        assert!(driver.with_field("not_a_field", dec!(1)).is_err());
    }
}
