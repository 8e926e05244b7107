//! Voucher Store (C2): admission rules and the draft/reviewed/confirmed/
//! voided state machine (spec 4.1).
//!
//! All functions here are pure: they take already-loaded data via closures
//! (mirroring the reference workspace's
//! `ledger::service::LedgerService::validate_and_resolve` split between
//! business logic and persistence) and return either a value or a
//! [`LedgerError`]. The repository layer in `zeltra-db` is the only code
//! that calls these from inside a transaction.

use zeltra_shared::types::VoucherId;

use crate::coa::DimensionType;
use crate::period::PeriodStatus;

use super::error::LedgerError;
use super::types::{EntryKind, Voucher, VoucherEntryRequest, VoucherRequest, VoucherStatus, VoucherTotals};

/// What `admit` learned about one referenced account.
#[derive(Debug, Clone, Copy)]
pub struct AccountAdmission {
    /// Whether the account is currently enabled.
    pub enabled: bool,
}

/// Outcome of submitting a voucher request.
#[derive(Debug, Clone)]
pub enum Admission {
    /// A genuinely new voucher, in `draft` status.
    New,
    /// `source_event_id` had already been seen; the prior voucher is
    /// returned unchanged (P7).
    Idempotent(VoucherId),
}

/// Runs every admission rule from spec 4.1 against a voucher request,
/// in the order the spec lists them: balance check, account existence,
/// period admission, idempotency.
///
/// Idempotency is checked last only for the purpose of this function's
/// control flow — in the repository layer the idempotency lookup should
/// run first since it can short-circuit the others entirely (spec 4.1:
/// "If the submission carries a `source_event_id` already seen, the prior
/// voucher is returned unchanged"). `admit` still validates that case
/// because a caller may want both the admission result and the
/// confirmation that the *new* request would have been valid.
///
/// # Errors
///
/// Returns the first rule violation encountered:
/// [`LedgerError::NotBalanced`], [`LedgerError::AccountNotFound`],
/// [`LedgerError::AccountDisabled`], [`LedgerError::DimensionNotFound`],
/// [`LedgerError::DimensionDisabled`], [`LedgerError::PeriodClosed`], or
/// [`LedgerError::PeriodAdjustmentOnly`].
pub fn admit<A, D, P, I>(
    request: &VoucherRequest,
    account_lookup: A,
    dimension_lookup: D,
    period_lookup: P,
    idempotency_lookup: I,
) -> Result<Admission, LedgerError>
where
    A: Fn(&str) -> Option<AccountAdmission>,
    D: Fn(DimensionType, uuid::Uuid) -> Option<bool>,
    P: Fn(&str) -> Option<PeriodStatus>,
    I: Fn(&str) -> Option<VoucherId>,
{
    if let Some(event_id) = &request.source_event_id {
        if let Some(existing) = idempotency_lookup(event_id) {
            return Ok(Admission::Idempotent(existing));
        }
    }

    validate_balance(&request.entries)?;
    validate_accounts(&request.entries, &account_lookup)?;
    validate_dimensions(&request.entries, &dimension_lookup)?;

    let period = Voucher::derive_period(request.posting_date);
    validate_period_admission(&period, request.entry_type, &period_lookup)?;

    Ok(Admission::New)
}

/// Balance check: `|debit - credit| <= 0.01` (spec 4.1, P1). A voucher with
/// zero entries is legal only if both sums are zero, which this check
/// admits naturally.
///
/// # Errors
///
/// Returns [`LedgerError::NotBalanced`] otherwise.
pub fn validate_balance(entries: &[VoucherEntryRequest]) -> Result<(), LedgerError> {
    let totals = VoucherTotals::of(entries);
    if !totals.is_balanced() {
        return Err(LedgerError::NotBalanced {
            debit: totals.debit,
            credit: totals.credit,
            diff: totals.diff(),
        });
    }
    Ok(())
}

/// Account-existence check: every entry's account must be present and
/// enabled.
///
/// # Errors
///
/// Returns [`LedgerError::AccountNotFound`] or
/// [`LedgerError::AccountDisabled`].
pub fn validate_accounts<A>(
    entries: &[VoucherEntryRequest],
    account_lookup: &A,
) -> Result<(), LedgerError>
where
    A: Fn(&str) -> Option<AccountAdmission>,
{
    for entry in entries {
        match account_lookup(&entry.account_code) {
            None => return Err(LedgerError::AccountNotFound(entry.account_code.clone())),
            Some(info) if !info.enabled => {
                return Err(LedgerError::AccountDisabled(entry.account_code.clone()))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Dimension-existence check: every nonzero dimension reference on every
/// entry must resolve to an enabled value of the matching type.
///
/// # Errors
///
/// Returns [`LedgerError::DimensionNotFound`] or
/// [`LedgerError::DimensionDisabled`].
pub fn validate_dimensions<D>(
    entries: &[VoucherEntryRequest],
    dimension_lookup: &D,
) -> Result<(), LedgerError>
where
    D: Fn(DimensionType, uuid::Uuid) -> Option<bool>,
{
    for entry in entries {
        for (dim_type, id) in [
            (DimensionType::Department, entry.dimensions.department),
            (DimensionType::Project, entry.dimensions.project),
            (DimensionType::Customer, entry.dimensions.customer),
            (DimensionType::Supplier, entry.dimensions.supplier),
            (DimensionType::Employee, entry.dimensions.employee),
        ] {
            if id.is_none() {
                continue;
            }
            match dimension_lookup(dim_type, id.into_inner()) {
                None => return Err(LedgerError::DimensionNotFound(id.to_string())),
                Some(false) => return Err(LedgerError::DimensionDisabled(id.to_string())),
                Some(true) => {}
            }
        }
    }
    Ok(())
}

/// Period-admission check: derived period must be `open` for a `normal`
/// voucher, or `adjustment` for an `adjustment` voucher.
///
/// # Errors
///
/// Returns [`LedgerError::PeriodClosed`] if the period is `closed`, or
/// [`LedgerError::PeriodAdjustmentOnly`] if a `normal` voucher targets an
/// `adjustment` period. A period absent from the lookup is treated as
/// closed — an unseeded period never silently admits postings.
pub fn validate_period_admission<P>(
    period: &str,
    entry_type: EntryKind,
    period_lookup: &P,
) -> Result<(), LedgerError>
where
    P: Fn(&str) -> Option<PeriodStatus>,
{
    let status = period_lookup(period).unwrap_or(PeriodStatus::Closed);
    if status.admits(entry_type) {
        return Ok(());
    }
    match status {
        PeriodStatus::Closed => Err(LedgerError::PeriodClosed(period.to_string())),
        PeriodStatus::Adjustment => Err(LedgerError::PeriodAdjustmentOnly(period.to_string())),
        PeriodStatus::Open => {
            // Open admits normal only; an adjustment voucher against an
            // open period has no dedicated error code in spec 6, so it is
            // rejected the same way a closed period would be — the period
            // simply isn't in the right state for this entry kind yet.
            Err(LedgerError::PeriodClosed(period.to_string()))
        }
    }
}

/// Validates a `review` transition (`draft -> reviewed`).
///
/// # Errors
///
/// Returns [`LedgerError::IllegalTransition`] if `status` is not `draft`.
pub fn validate_review(id: VoucherId, status: VoucherStatus) -> Result<(), LedgerError> {
    transition_guard(id, status, VoucherStatus::can_review, "review requires draft")
}

/// Validates an `unreview` transition (`reviewed -> draft`).
///
/// # Errors
///
/// Returns [`LedgerError::IllegalTransition`] if `status` is not
/// `reviewed`.
pub fn validate_unreview(id: VoucherId, status: VoucherStatus) -> Result<(), LedgerError> {
    transition_guard(
        id,
        status,
        VoucherStatus::can_unreview,
        "unreview requires reviewed",
    )
}

/// Validates a `confirm` transition (`reviewed -> confirmed`).
///
/// # Errors
///
/// Returns [`LedgerError::VoucherNotReviewed`] if `status` is not
/// `reviewed`.
pub fn validate_confirm(id: VoucherId, status: VoucherStatus) -> Result<(), LedgerError> {
    if !status.can_confirm() {
        return Err(LedgerError::VoucherNotReviewed(id));
    }
    Ok(())
}

/// Validates a `delete` transition (`draft -> gone`).
///
/// # Errors
///
/// Returns [`LedgerError::IllegalTransition`] if `status` is not `draft`.
pub fn validate_delete(id: VoucherId, status: VoucherStatus) -> Result<(), LedgerError> {
    transition_guard(id, status, VoucherStatus::can_delete, "delete requires draft")
}

/// Validates a `void` transition (`confirmed -> voided`).
///
/// # Errors
///
/// Returns [`LedgerError::VoidConfirmed`] if `status` is not `confirmed`.
pub fn validate_void(id: VoucherId, status: VoucherStatus) -> Result<(), LedgerError> {
    if !status.can_void() {
        return Err(LedgerError::VoidConfirmed(id));
    }
    Ok(())
}

fn transition_guard(
    id: VoucherId,
    status: VoucherStatus,
    check: fn(VoucherStatus) -> bool,
    reason: &'static str,
) -> Result<(), LedgerError> {
    if !check(status) {
        return Err(LedgerError::IllegalTransition(id, reason));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::DimensionKey;
    use rust_decimal_macros::dec;

    fn entry(account: &str, debit: rust_decimal::Decimal, credit: rust_decimal::Decimal) -> VoucherEntryRequest {
        VoucherEntryRequest {
            account_code: account.to_string(),
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
    fn balanced_voucher_passes() {
        let entries = vec![entry("1001", dec!(1000), dec!(0)), entry("1002", dec!(0), dec!(1000))];
        assert!(validate_balance(&entries).is_ok());
    }

    #[test]
    fn unbalanced_voucher_reports_totals() {
        let entries = vec![entry("1001", dec!(1000), dec!(0)), entry("1002", dec!(0), dec!(999))];
        let err = validate_balance(&entries).unwrap_err();
        match err {
            LedgerError::NotBalanced { debit, credit, diff } => {
                assert_eq!(debit, dec!(1000));
                assert_eq!(credit, dec!(999));
                assert_eq!(diff, dec!(1));
            }
            other => panic!("expected NotBalanced, got {other:?}"),
        }
    }

    #[test]
    fn within_tolerance_passes() {
        let entries = vec![entry("1001", dec!(1000.00), dec!(0)), entry("1002", dec!(0), dec!(999.995))];
        // diff is 0.005, within the 0.01 tolerance
        assert!(validate_balance(&entries).is_ok());
    }

    #[test]
    fn zero_entries_with_zero_sums_is_legal() {
        assert!(validate_balance(&[]).is_ok());
    }

    #[test]
    fn missing_account_fails() {
        let entries = vec![entry("9999", dec!(100), dec!(0))];
        let err = validate_accounts(&entries, &|_| None).unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
    }

    #[test]
    fn disabled_account_fails() {
        let entries = vec![entry("1001", dec!(100), dec!(0))];
        let err = validate_accounts(&entries, &|_| Some(AccountAdmission { enabled: false }))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountDisabled(_)));
    }

    #[test]
    fn normal_voucher_rejected_in_adjustment_period() {
        let err = validate_period_admission("2025-01", EntryKind::Normal, &|_| {
            Some(PeriodStatus::Adjustment)
        })
        .unwrap_err();
        assert!(matches!(err, LedgerError::PeriodAdjustmentOnly(_)));
    }

    #[test]
    fn any_voucher_rejected_in_closed_period() {
        let err = validate_period_admission("2025-01", EntryKind::Adjustment, &|_| {
            Some(PeriodStatus::Closed)
        })
        .unwrap_err();
        assert!(matches!(err, LedgerError::PeriodClosed(_)));
    }

    #[test]
    fn adjustment_voucher_admitted_in_adjustment_period() {
        assert!(validate_period_admission("2025-01", EntryKind::Adjustment, &|_| {
            Some(PeriodStatus::Adjustment)
        })
        .is_ok());
    }

    #[test]
    fn state_machine_transitions() {
        let id = VoucherId::new();
        assert!(validate_review(id, VoucherStatus::Draft).is_ok());
        assert!(validate_review(id, VoucherStatus::Reviewed).is_err());
        assert!(validate_confirm(id, VoucherStatus::Reviewed).is_ok());
        assert!(matches!(
            validate_confirm(id, VoucherStatus::Draft),
            Err(LedgerError::VoucherNotReviewed(_))
        ));
        assert!(validate_delete(id, VoucherStatus::Draft).is_ok());
        assert!(validate_delete(id, VoucherStatus::Confirmed).is_err());
        assert!(validate_void(id, VoucherStatus::Confirmed).is_ok());
        assert!(matches!(
            validate_void(id, VoucherStatus::Draft),
            Err(LedgerError::VoidConfirmed(_))
        ));
    }
}
