//! Voucher and voucher-entry domain types (spec 3).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_shared::types::{Currency, VoucherEntryId, VoucherId};

use crate::coa::DimensionKey;

/// Tolerance within which a voucher's debit and credit totals may differ
/// and still be considered balanced (spec 3, P1).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Lifecycle status of a voucher (spec 4.1's state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Submitted, not yet reviewed. Editable, not yet balance-checked
    /// against the live account set.
    Draft,
    /// Reviewed and ready for confirmation.
    Reviewed,
    /// Confirmed: posted to the balance index, immutable thereafter except
    /// via `void`.
    Confirmed,
    /// Voided: the original entries are retained for audit, but a reversal
    /// voucher has zeroed their balance effect.
    Voided,
}

impl VoucherStatus {
    /// Whether `review` is legal from this status.
    #[must_use]
    pub fn can_review(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether `unreview` is legal from this status.
    #[must_use]
    pub fn can_unreview(self) -> bool {
        matches!(self, Self::Reviewed)
    }

    /// Whether `confirm` is legal from this status.
    #[must_use]
    pub fn can_confirm(self) -> bool {
        matches!(self, Self::Reviewed)
    }

    /// Whether `delete` is legal from this status.
    #[must_use]
    pub fn can_delete(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether `void` is legal from this status.
    #[must_use]
    pub fn can_void(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Whether a voucher posts as an ordinary business entry or as a
/// period-adjustment entry (spec 4.1's period-admission rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Ordinary entry; admitted only into an `open` period.
    Normal,
    /// Adjustment entry; admitted only into an `adjustment` period.
    Adjustment,
}

/// Voucher header (spec 3's `Voucher`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Internal identifier.
    pub id: VoucherId,
    /// Externally-visible number, assigned at first confirmation. Format
    /// `V<YYYYMMDD><3-digit seq>`, never reused.
    pub voucher_no: Option<String>,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Derived period, `YYYY-MM`, computed from `posting_date`.
    pub period: String,
    /// Free-text description.
    pub description: String,
    /// Current lifecycle status.
    pub status: VoucherStatus,
    /// Normal vs. adjustment entry.
    pub entry_type: EntryKind,
    /// Closing-template code, if this voucher was synthesized by one.
    pub source_template: Option<String>,
    /// Idempotency key from the originating event, if any (spec 4.1,
    /// P7).
    pub source_event_id: Option<String>,
    /// Back-reference to the voucher this one reverses, if it is a
    /// red-letter reversal (spec 3's `VoidLink`).
    pub void_of: Option<VoucherId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Confirmation timestamp, if confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Void timestamp, if voided.
    pub voided_at: Option<DateTime<Utc>>,
}

impl Voucher {
    /// Derives the `YYYY-MM` period string from a posting date.
    #[must_use]
    pub fn derive_period(date: NaiveDate) -> String {
        date.format("%Y-%m").to_string()
    }
}

/// A single entry line within a voucher (spec 3's `VoucherEntry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherEntry {
    /// Unique identifier.
    pub id: VoucherEntryId,
    /// Owning voucher.
    pub voucher_id: VoucherId,
    /// 1-based position within the voucher.
    pub line_no: i32,
    /// Account code posted to.
    pub account_code: String,
    /// Optional line-level description.
    pub description: Option<String>,
    /// Debit amount in functional currency, always >= 0.
    pub debit: Decimal,
    /// Credit amount in functional currency, always >= 0.
    pub credit: Decimal,
    /// Foreign currency, when this entry is multi-currency. `None` means
    /// the entry is already in the functional currency.
    pub currency: Option<Currency>,
    /// Exchange rate applied, when `currency` is `Some`.
    pub fx_rate: Option<Decimal>,
    /// Debit amount in the foreign currency, when `currency` is `Some`.
    pub foreign_debit: Option<Decimal>,
    /// Credit amount in the foreign currency, when `currency` is `Some`.
    pub foreign_credit: Option<Decimal>,
    /// Dimension references, using the sentinel for absent ones.
    pub dimensions: DimensionKey,
}

impl VoucherEntry {
    /// Debit minus credit — the entry's contribution to a debit-natured
    /// account's closing balance.
    #[must_use]
    pub fn signed(&self) -> Decimal {
        self.debit - self.credit
    }

    /// A reversal of this entry: debit and credit swapped (spec 3's
    /// `VoidLink`: "amounts negated (debit<->credit swap is equivalent)").
    #[must_use]
    pub fn reversed(&self, new_id: VoucherEntryId, new_voucher: VoucherId) -> Self {
        Self {
            id: new_id,
            voucher_id: new_voucher,
            line_no: self.line_no,
            account_code: self.account_code.clone(),
            description: self.description.clone(),
            debit: self.credit,
            credit: self.debit,
            currency: self.currency,
            fx_rate: self.fx_rate,
            foreign_debit: self.foreign_credit,
            foreign_credit: self.foreign_debit,
            dimensions: self.dimensions,
        }
    }
}

/// Input for submitting a new voucher (not yet assigned an id).
#[derive(Debug, Clone)]
pub struct VoucherRequest {
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Normal vs. adjustment.
    pub entry_type: EntryKind,
    /// Entry lines, in order.
    pub entries: Vec<VoucherEntryRequest>,
    /// Closing-template code, if synthesized by one.
    pub source_template: Option<String>,
    /// Idempotency key.
    pub source_event_id: Option<String>,
}

/// One entry line within a [`VoucherRequest`].
#[derive(Debug, Clone)]
pub struct VoucherEntryRequest {
    /// Account code.
    pub account_code: String,
    /// Line description.
    pub description: Option<String>,
    /// Debit amount, >= 0.
    pub debit: Decimal,
    /// Credit amount, >= 0.
    pub credit: Decimal,
    /// Foreign currency context, if any.
    pub currency: Option<Currency>,
    /// Exchange rate, required when `currency` is `Some`.
    pub fx_rate: Option<Decimal>,
    /// Foreign debit, required when `currency` is `Some`.
    pub foreign_debit: Option<Decimal>,
    /// Foreign credit, required when `currency` is `Some`.
    pub foreign_credit: Option<Decimal>,
    /// Dimension references.
    pub dimensions: DimensionKey,
}

/// Totals used by the balance check (spec 4.1).
#[derive(Debug, Clone, Copy)]
pub struct VoucherTotals {
    /// Sum of debit amounts.
    pub debit: Decimal,
    /// Sum of credit amounts.
    pub credit: Decimal,
}

impl VoucherTotals {
    /// Computes totals over a set of entry requests.
    #[must_use]
    pub fn of(entries: &[VoucherEntryRequest]) -> Self {
        Self {
            debit: entries.iter().map(|e| e.debit).sum(),
            credit: entries.iter().map(|e| e.credit).sum(),
        }
    }

    /// Signed `debit - credit`.
    #[must_use]
    pub fn diff(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Whether the difference lies within [`BALANCE_TOLERANCE`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.diff().abs() <= BALANCE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_period_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(Voucher::derive_period(date), "2025-01");
    }

    #[test]
    fn reversal_swaps_debit_and_credit() {
        let entry = VoucherEntry {
            id: VoucherEntryId::new(),
            voucher_id: VoucherId::new(),
            line_no: 1,
            account_code: "1001".into(),
            description: None,
            debit: rust_decimal_macros::dec!(100),
            credit: rust_decimal_macros::dec!(0),
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        };
        let reversed = entry.reversed(VoucherEntryId::new(), VoucherId::new());
        assert_eq!(reversed.debit, rust_decimal_macros::dec!(0));
        assert_eq!(reversed.credit, rust_decimal_macros::dec!(100));
    }
}
