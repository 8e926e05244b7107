//! Balance Engine (C3): the flat balance index keyed by account, period,
//! and the five dimension values, plus period rollover (spec 3, 4.2, P2).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coa::{Account, DimensionKey};

use super::types::VoucherEntry;

/// The 8-tuple balance key (spec 3, 6): account code, period, and the five
/// dimension values (using the sentinel when absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Account code.
    pub account_code: String,
    /// `YYYY-MM` period.
    pub period: String,
    /// Dimension references.
    pub dimensions: DimensionKey,
}

impl BalanceKey {
    /// Builds a key from an account code, period, and dimension set.
    #[must_use]
    pub fn new(account_code: impl Into<String>, period: impl Into<String>, dimensions: DimensionKey) -> Self {
        Self {
            account_code: account_code.into(),
            period: period.into(),
            dimensions,
        }
    }
}

/// One row of the balance index (spec 3's `Balance`): period activity plus
/// the carried-forward opening/closing balances, for both functional and
/// (when the account is revaluable and entries carry a foreign currency)
/// foreign-currency amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// The key this row is indexed by.
    pub key: BalanceKey,
    /// Opening balance, carried from the prior period's closing balance.
    pub opening_balance: Decimal,
    /// Sum of debit amounts posted in this period.
    pub debit_total: Decimal,
    /// Sum of credit amounts posted in this period.
    pub credit_total: Decimal,
    /// `opening_balance + debit_total - credit_total`, signed per the
    /// account's normal side (spec 3's Balance invariant).
    pub closing_balance: Decimal,
    /// Foreign-currency opening balance, when tracked.
    pub foreign_opening_balance: Option<Decimal>,
    /// Foreign-currency debit total, when tracked.
    pub foreign_debit_total: Option<Decimal>,
    /// Foreign-currency credit total, when tracked.
    pub foreign_credit_total: Option<Decimal>,
    /// Foreign-currency closing balance, when tracked.
    pub foreign_closing_balance: Option<Decimal>,
}

impl Balance {
    /// A fresh, all-zero balance row for `key`, with `opening_balance`
    /// seeded from the prior period (0 for a period's very first row).
    #[must_use]
    pub fn opening(key: BalanceKey, opening_balance: Decimal, foreign_opening_balance: Option<Decimal>) -> Self {
        Self {
            key,
            opening_balance,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            closing_balance: opening_balance,
            foreign_opening_balance,
            foreign_debit_total: foreign_opening_balance.map(|_| Decimal::ZERO),
            foreign_credit_total: foreign_opening_balance.map(|_| Decimal::ZERO),
            foreign_closing_balance: foreign_opening_balance,
        }
    }

    /// Applies one confirmed entry's functional (and, when present,
    /// foreign-currency) amounts to this row. Idempotent only in the sense
    /// that applying the same entry twice double-counts it — callers must
    /// ensure an entry is applied exactly once per confirm and exactly
    /// once more (with debit/credit swapped) per void, never replayed
    /// arbitrarily outside of a full rebuild (see [`rebuild`]).
    pub fn apply_entry(&mut self, account: &Account, entry: &VoucherEntry) {
        self.debit_total += entry.debit;
        self.credit_total += entry.credit;
        self.closing_balance =
            self.opening_balance + account.apply_sign(self.debit_total, self.credit_total);

        if let (Some(fd), Some(fc)) = (entry.foreign_debit, entry.foreign_credit) {
            let opening = self.foreign_opening_balance.unwrap_or(Decimal::ZERO);
            self.foreign_opening_balance.get_or_insert(Decimal::ZERO);
            let debit_total = *self.foreign_debit_total.get_or_insert(Decimal::ZERO) + fd;
            let credit_total = *self.foreign_credit_total.get_or_insert(Decimal::ZERO) + fc;
            self.foreign_debit_total = Some(debit_total);
            self.foreign_credit_total = Some(credit_total);
            self.foreign_closing_balance = Some(opening + account.apply_sign(debit_total, credit_total));
        }
    }

    /// Applies a void: the reversing entry (debit/credit already swapped
    /// by [`VoucherEntry::reversed`]) is applied exactly like any other
    /// entry, which nets the original posting back to zero while leaving
    /// both entries visible in the audit trail (spec 3's `VoidLink`).
    pub fn apply_void(&mut self, account: &Account, reversal_entry: &VoucherEntry) {
        self.apply_entry(account, reversal_entry);
    }

    /// Rolls this period's closing balance forward as the next period's
    /// opening balance (spec 4.2: `opening(P+1) = closing(P)`). Running
    /// this twice for the same target period is idempotent: it simply
    /// re-seeds the same opening figure, since closing balances do not
    /// change once a period is closed.
    #[must_use]
    pub fn roll_forward(&self, next_period: impl Into<String>) -> Self {
        Self::opening(
            BalanceKey::new(self.key.account_code.clone(), next_period, self.key.dimensions),
            self.closing_balance,
            self.foreign_closing_balance,
        )
    }
}

/// Rebuilds the full balance index from scratch by replaying every
/// confirmed voucher's entries, in voucher-number (hence chronological
/// confirmation) order, against a zeroed set of rows (spec 4.2, P2:
/// "Rebuilding balances by replaying all confirmed vouchers... in
/// voucher-number order produces the persisted balance index exactly").
///
/// `entries` must already be filtered to confirmed, non-voided vouchers'
/// entries (plus any void-reversal entries), in posting order; this
/// function performs no status filtering of its own since it has no
/// voucher-header context, only entries and the accounts they post to.
///
/// `account_lookup` must resolve every account code referenced by
/// `entries`; a missing account is skipped (its entries are dropped from
/// the rebuild) rather than panicking, since a rebuild must be able to
/// run against a partially-seeded sandbox without crashing.
#[must_use]
pub fn rebuild<A>(entries: &[(String, VoucherEntry)], account_lookup: A) -> Vec<Balance>
where
    A: Fn(&str) -> Option<Account>,
{
    use std::collections::BTreeMap;

    let mut rows: BTreeMap<BalanceKey, Balance> = BTreeMap::new();

    for (period, entry) in entries {
        let Some(account) = account_lookup(&entry.account_code) else {
            continue;
        };
        let key = BalanceKey::new(entry.account_code.clone(), period.clone(), entry.dimensions);
        let row = rows
            .entry(key.clone())
            .or_insert_with(|| Balance::opening(key, Decimal::ZERO, entry.currency.map(|_| Decimal::ZERO)));
        row.apply_entry(&account, entry);
    }

    rows.into_values().collect()
}

impl Ord for BalanceKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.account_code, &self.period, self.dimensions.department.into_inner(), self.dimensions.project.into_inner(), self.dimensions.customer.into_inner(), self.dimensions.supplier.into_inner(), self.dimensions.employee.into_inner())
            .cmp(&(&other.account_code, &other.period, other.dimensions.department.into_inner(), other.dimensions.project.into_inner(), other.dimensions.customer.into_inner(), other.dimensions.supplier.into_inner(), other.dimensions.employee.into_inner()))
    }
}

impl PartialOrd for BalanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::{AccountType, CashFlowCategory, NormalSide};
    use rust_decimal_macros::dec;
    use zeltra_shared::types::{VoucherEntryId, VoucherId};

    fn cash_account() -> Account {
        Account {
            code: "1001".into(),
            name: "Cash".into(),
            account_type: AccountType::Asset,
            normal_side: NormalSide::Debit,
            cash_flow_category: CashFlowCategory::Operating,
            parent_code: None,
            enabled: true,
            system_seeded: true,
            revaluable: false,
        }
    }

    fn entry(debit: Decimal, credit: Decimal) -> VoucherEntry {
        VoucherEntry {
            id: VoucherEntryId::new(),
            voucher_id: VoucherId::new(),
            line_no: 1,
            account_code: "1001".into(),
            description: None,
            debit,
            credit,
            currency: None,
            fx_rate: None,
            foreign_debit: None,
            foreign_credit: None,
            dimensions: DimensionKey::none(),
        }
    }

    #[test]
    fn debit_normal_account_accumulates_on_debit() {
        let account = cash_account();
        let key = BalanceKey::new("1001", "2025-01", DimensionKey::none());
        let mut balance = Balance::opening(key, dec!(1000), None);
        balance.apply_entry(&account, &entry(dec!(500), dec!(0)));
        assert_eq!(balance.closing_balance, dec!(1500));
        balance.apply_entry(&account, &entry(dec!(0), dec!(200)));
        assert_eq!(balance.closing_balance, dec!(1300));
    }

    #[test]
    fn void_nets_back_to_original_balance() {
        let account = cash_account();
        let key = BalanceKey::new("1001", "2025-01", DimensionKey::none());
        let mut balance = Balance::opening(key, dec!(1000), None);
        let original = entry(dec!(500), dec!(0));
        balance.apply_entry(&account, &original);
        assert_eq!(balance.closing_balance, dec!(1500));

        let reversal = original.reversed(VoucherEntryId::new(), VoucherId::new());
        balance.apply_void(&account, &reversal);
        assert_eq!(balance.closing_balance, dec!(1000));
    }

    #[test]
    fn roll_forward_seeds_next_period_opening() {
        let account = cash_account();
        let key = BalanceKey::new("1001", "2025-01", DimensionKey::none());
        let mut balance = Balance::opening(key, dec!(1000), None);
        balance.apply_entry(&account, &entry(dec!(500), dec!(0)));

        let next = balance.roll_forward("2025-02");
        assert_eq!(next.opening_balance, dec!(1500));
        assert_eq!(next.closing_balance, dec!(1500));
        assert_eq!(next.debit_total, Decimal::ZERO);
        assert_eq!(next.key.period, "2025-02");
    }

    #[test]
    fn rebuild_matches_incremental_application() {
        let period = "2025-01".to_string();
        let entries = vec![
            (period.clone(), entry(dec!(1000), dec!(0))),
            (period.clone(), entry(dec!(0), dec!(300))),
            (period, entry(dec!(200), dec!(0))),
        ];
        let rows = rebuild(&entries, |code| {
            (code == "1001").then(cash_account)
        });
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closing_balance, dec!(900));
    }
}
