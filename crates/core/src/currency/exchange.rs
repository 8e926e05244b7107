//! Exchange rate types and lookup (spec 3: `ExchangeRate` keyed by
//! `(currency, date, rate_type)`, nearest-prior-date lookup within a
//! rate-type).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::round_rate;

/// Which point-in-time convention a rate was recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// The rate in effect for a specific transaction.
    Spot,
    /// The period-end rate used for balance-sheet revaluation.
    Closing,
    /// A period's average rate, used for some income-statement
    /// translations.
    Average,
}

/// One recorded exchange rate: `1 currency = rate` units of the functional
/// currency, effective from `date` under `rate_type` until superseded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Foreign currency code (the functional currency is implicit —
    /// rates are always quoted against it).
    pub currency: String,
    /// Date this rate was recorded.
    pub date: NaiveDate,
    /// Rate convention.
    pub rate_type: RateType,
    /// Rate, rounded to six decimals (spec 3).
    pub rate: Decimal,
    /// Free-text provenance (e.g. `"central-bank"`, `"manual"`).
    pub source: String,
}

impl ExchangeRate {
    /// Creates a new rate, rounding to the spec's six-decimal precision.
    #[must_use]
    pub fn new(currency: String, date: NaiveDate, rate_type: RateType, rate: Decimal, source: String) -> Self {
        Self {
            currency,
            date,
            rate_type,
            rate: round_rate(rate),
            source,
        }
    }
}

/// Finds the rate effective for `currency`/`rate_type` on `date`: the
/// latest recorded rate with `date <= as_of`, per the spec's nearest-
/// prior-date rule. `rates` need not be sorted or pre-filtered.
#[must_use]
pub fn lookup_rate<'a>(
    rates: &'a [ExchangeRate],
    currency: &str,
    rate_type: RateType,
    as_of: NaiveDate,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.currency == currency && r.rate_type == rate_type && r.date <= as_of)
        .max_by_key(|r| r.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(date: NaiveDate, value: Decimal) -> ExchangeRate {
        ExchangeRate::new("USD".into(), date, RateType::Closing, value, "test".into())
    }

    #[test]
    fn rounds_to_six_decimals() {
        let r = rate(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            dec!(7.123456789),
        );
        assert_eq!(r.rate, dec!(7.123457));
    }

    #[test]
    fn lookup_finds_nearest_prior_date() {
        let rates = vec![
            rate(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), dec!(7.0)),
            rate(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), dec!(7.2)),
        ];
        let found = lookup_rate(
            &rates,
            "USD",
            RateType::Closing,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(found.rate, dec!(7.0));
    }

    #[test]
    fn lookup_ignores_future_dates() {
        let rates = vec![rate(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), dec!(7.2))];
        assert!(lookup_rate(
            &rates,
            "USD",
            RateType::Closing,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .is_none());
    }

    #[test]
    fn lookup_respects_rate_type() {
        let rates = vec![rate(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), dec!(7.0))];
        assert!(lookup_rate(
            &rates,
            "USD",
            RateType::Spot,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .is_none());
    }
}
