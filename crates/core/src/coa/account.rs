//! Account tree: code, type, normal side, cash-flow category.

use serde::{Deserialize, Serialize};

use super::error::CoaError;

/// The five fundamental account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset account (debit-normal).
    Asset,
    /// Liability account (credit-normal).
    Liability,
    /// Equity account (credit-normal).
    Equity,
    /// Revenue account (credit-normal).
    Revenue,
    /// Expense account (debit-normal).
    Expense,
}

impl AccountType {
    /// The side an account of this type naturally accumulates on.
    #[must_use]
    pub const fn default_normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }
}

/// The side (debit or credit) on which an account's balance accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSide {
    /// Debit-normal: closing = opening + debit - credit.
    Debit,
    /// Credit-normal: closing = opening - debit + credit.
    Credit,
}

/// Cash-flow-statement classification carried by an account, used by the
/// indirect-method cash-flow derivation (spec 4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    /// Operating activity.
    Operating,
    /// Investing activity.
    Investing,
    /// Financing activity.
    Financing,
    /// Not classified (e.g. the account is not cash-affecting, or its
    /// movements are captured through another account's category).
    None,
}

/// A chart-of-accounts account, identified by a stable, hierarchical code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable hierarchical code (dotted or prefixed), e.g. `"1001"` or
    /// `"1.1.01"`. Primary key — accounts are never keyed by a surrogate
    /// UUID (spec 6's `accounts(code, ...)`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Fundamental account type.
    pub account_type: AccountType,
    /// The side this account's balance naturally accumulates on.
    pub normal_side: NormalSide,
    /// Cash-flow-statement classification.
    pub cash_flow_category: CashFlowCategory,
    /// Code of the parent account, if any.
    pub parent_code: Option<String>,
    /// Whether voucher entries may currently post to this account.
    pub enabled: bool,
    /// Seeded at boot time; cannot be deleted (but can be disabled).
    pub system_seeded: bool,
    /// Subject to period-end foreign-currency revaluation (spec 4.4's FX
    /// layer).
    pub revaluable: bool,
}

impl Account {
    /// Validates a new account against its (already-loaded) parent, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CoaError::EmptyCode`] if `code` is empty, or
    /// [`CoaError::ParentTypeMismatch`] if `parent` is `Some` and its type
    /// differs from `self.account_type`.
    pub fn validate_against_parent(&self, parent: Option<&Account>) -> Result<(), CoaError> {
        if self.code.trim().is_empty() {
            return Err(CoaError::EmptyCode);
        }
        if let Some(parent_code) = &self.parent_code {
            let parent = parent.ok_or_else(|| CoaError::ParentNotFound(parent_code.clone()))?;
            if parent.account_type != self.account_type {
                return Err(CoaError::ParentTypeMismatch {
                    code: self.code.clone(),
                    child_type: self.account_type,
                    parent_code: parent.code.clone(),
                    parent_type: parent.account_type,
                });
            }
        }
        Ok(())
    }

    /// Returns the signed contribution of a debit/credit pair to this
    /// account's closing balance, honoring its normal side (spec 3's
    /// Balance invariant).
    #[must_use]
    pub fn apply_sign(
        &self,
        debit: rust_decimal::Decimal,
        credit: rust_decimal::Decimal,
    ) -> rust_decimal::Decimal {
        match self.normal_side {
            NormalSide::Debit => debit - credit,
            NormalSide::Credit => credit - debit,
        }
    }

    /// An account may be disabled once posted to, but a system-seeded
    /// account (or one with any ledger history) can never be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CoaError::DeleteNotAllowed`] if the account is
    /// system-seeded or `has_postings` is true.
    pub fn validate_can_delete(&self, has_postings: bool) -> Result<(), CoaError> {
        if self.system_seeded || has_postings {
            return Err(CoaError::DeleteNotAllowed(self.code.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(code: &str, account_type: AccountType, parent_code: Option<&str>) -> Account {
        Account {
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            normal_side: account_type.default_normal_side(),
            cash_flow_category: CashFlowCategory::None,
            parent_code: parent_code.map(str::to_string),
            enabled: true,
            system_seeded: false,
            revaluable: false,
        }
    }

    #[test]
    fn parent_type_must_match() {
        let parent = account("1000", AccountType::Asset, None);
        let child = account("1001", AccountType::Liability, Some("1000"));
        assert!(matches!(
            child.validate_against_parent(Some(&parent)),
            Err(CoaError::ParentTypeMismatch { .. })
        ));
    }

    #[test]
    fn parent_type_matching_is_ok() {
        let parent = account("1000", AccountType::Asset, None);
        let child = account("1001", AccountType::Asset, Some("1000"));
        assert!(child.validate_against_parent(Some(&parent)).is_ok());
    }

    #[test]
    fn missing_parent_is_an_error() {
        let child = account("1001", AccountType::Asset, Some("1000"));
        assert!(matches!(
            child.validate_against_parent(None),
            Err(CoaError::ParentNotFound(_))
        ));
    }

    #[test]
    fn debit_normal_sign() {
        let cash = account("1001", AccountType::Asset, None);
        assert_eq!(cash.apply_sign(dec!(100), dec!(40)), dec!(60));
    }

    #[test]
    fn credit_normal_sign() {
        let revenue = account("4001", AccountType::Revenue, None);
        assert_eq!(revenue.apply_sign(dec!(10), dec!(100)), dec!(90));
    }

    #[test]
    fn system_seeded_cannot_be_deleted() {
        let mut seeded = account("1001", AccountType::Asset, None);
        seeded.system_seeded = true;
        assert!(seeded.validate_can_delete(false).is_err());
    }

    #[test]
    fn posted_account_cannot_be_deleted() {
        let account = account("1001", AccountType::Asset, None);
        assert!(account.validate_can_delete(true).is_err());
        assert!(account.validate_can_delete(false).is_ok());
    }
}
