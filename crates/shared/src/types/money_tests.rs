use super::*;
use crate::types::money::Currency;
use rust_decimal::Decimal;
use std::str::FromStr;

fn usd() -> Currency {
    Currency::new("USD").unwrap()
}

#[test]
fn test_money_creation() {
    let money = Money::new(Decimal::new(100, 2), usd());
    assert_eq!(money.amount, Decimal::new(100, 2));
    assert_eq!(money.currency, usd());
}

#[test]
fn test_money_zero() {
    let money = Money::zero(usd());
    assert_eq!(money.amount, Decimal::ZERO);
    assert!(money.is_zero());
}

#[test]
fn test_money_negative() {
    let money = Money::new(Decimal::new(-100, 2), usd());
    assert!(money.is_negative());
}

#[test]
fn test_currency_display() {
    assert_eq!(format!("{}", Currency::new("USD").unwrap()), "USD");
    assert_eq!(format!("{}", Currency::new("idr").unwrap()), "IDR");
}

#[test]
fn test_currency_from_str_normalizes_case() {
    assert_eq!(Currency::from_str("usd").unwrap(), Currency::new("USD").unwrap());
    assert_eq!(Currency::from_str("EUR").unwrap(), Currency::new("eur").unwrap());
}

#[test]
fn test_currency_rejects_wrong_length() {
    assert!(Currency::from_str("US").is_err());
    assert!(Currency::from_str("USDD").is_err());
}

#[test]
fn test_currency_rejects_non_alphabetic() {
    assert!(Currency::from_str("US1").is_err());
    assert!(Currency::from_str("$$$").is_err());
}

#[test]
fn test_currency_accepts_arbitrary_iso_codes() {
    // The point of the newtype over the old closed enum: codes outside the
    // historical USD/IDR/EUR/SGD/JPY set are not rejected.
    assert!(Currency::new("AUD").is_ok());
    assert!(Currency::new("CHF").is_ok());
    assert!(Currency::new("ZAR").is_ok());
}

#[test]
fn test_currency_roundtrips_through_serde_json() {
    let c = Currency::new("GBP").unwrap();
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "\"GBP\"");
    let back: Currency = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn test_currency_rejects_invalid_serde_json() {
    let result: Result<Currency, _> = serde_json::from_str("\"US\"");
    assert!(result.is_err());
}
