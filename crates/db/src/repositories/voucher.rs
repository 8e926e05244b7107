//! Voucher store repository (C2): submit/review/confirm/void, orchestrating
//! the pure admission rules and balance index updates inside one SeaORM
//! transaction per operation (spec 5's "commits all effects or leaves the
//! ledger unchanged").

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use zeltra_core::coa::{Account, DimensionKey};
use zeltra_core::ledger::{
    format_voucher_no, rebuild as rebuild_balances, voucher as voucher_rules, LedgerError,
    Voucher, VoucherEntry, VoucherRequest, VoucherStatus,
};
use zeltra_shared::types::{VoucherEntryId, VoucherId};

use crate::entities::voucher::{void_vouchers, voucher_entries, voucher_events, vouchers};

use super::account::AccountRepository;

fn dim_uuid(id: zeltra_shared::types::DimensionValueId) -> Uuid {
    id.into_inner()
}

fn dim_from_uuid(id: Uuid) -> zeltra_shared::types::DimensionValueId {
    zeltra_shared::types::DimensionValueId::from_uuid(id)
}

fn status_str(status: VoucherStatus) -> &'static str {
    match status {
        VoucherStatus::Draft => "draft",
        VoucherStatus::Reviewed => "reviewed",
        VoucherStatus::Confirmed => "confirmed",
        VoucherStatus::Voided => "voided",
    }
}

fn parse_status(s: &str) -> VoucherStatus {
    match s {
        "reviewed" => VoucherStatus::Reviewed,
        "confirmed" => VoucherStatus::Confirmed,
        "voided" => VoucherStatus::Voided,
        _ => VoucherStatus::Draft,
    }
}

fn entry_kind_str(kind: zeltra_core::ledger::EntryKind) -> &'static str {
    match kind {
        zeltra_core::ledger::EntryKind::Normal => "normal",
        zeltra_core::ledger::EntryKind::Adjustment => "adjustment",
    }
}

fn parse_entry_kind(s: &str) -> zeltra_core::ledger::EntryKind {
    if s == "adjustment" {
        zeltra_core::ledger::EntryKind::Adjustment
    } else {
        zeltra_core::ledger::EntryKind::Normal
    }
}

fn header_to_domain(model: &vouchers::Model) -> Voucher {
    Voucher {
        id: VoucherId::from_uuid(model.id),
        voucher_no: model.voucher_no.clone(),
        posting_date: model.date,
        period: model.period.clone(),
        description: model.description.clone(),
        status: parse_status(&model.status),
        entry_type: parse_entry_kind(&model.entry_type),
        source_template: model.source_template.clone(),
        source_event_id: model.source_event_id.clone(),
        void_of: None,
        created_at: model.created_at.with_timezone(&Utc),
        confirmed_at: model.confirmed_at.map(|d| d.with_timezone(&Utc)),
        voided_at: model.voided_at.map(|d| d.with_timezone(&Utc)),
    }
}

fn entry_to_domain(model: &voucher_entries::Model) -> VoucherEntry {
    VoucherEntry {
        id: VoucherEntryId::from_uuid(model.id),
        voucher_id: VoucherId::from_uuid(model.voucher_id),
        line_no: model.line_no,
        account_code: model.account_code.clone(),
        description: model.description.clone(),
        debit: model.debit_amount,
        credit: model.credit_amount,
        currency: model
            .currency_code
            .as_deref()
            .and_then(|c| c.parse().ok()),
        fx_rate: model.fx_rate,
        foreign_debit: model.foreign_debit,
        foreign_credit: model.foreign_credit,
        dimensions: DimensionKey {
            department: dim_from_uuid(model.dept_id),
            project: dim_from_uuid(model.project_id),
            customer: dim_from_uuid(model.customer_id),
            supplier: dim_from_uuid(model.supplier_id),
            employee: dim_from_uuid(model.employee_id),
        },
    }
}

/// Repository for `vouchers`, `voucher_entries`, `void_vouchers`, and
/// `voucher_events`.
pub struct VoucherRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VoucherRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a voucher header plus its entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn find(&self, id: VoucherId) -> Result<Option<(Voucher, Vec<VoucherEntry>)>, LedgerError> {
        let Some(header) = vouchers::Entity::find_by_id(id.into_inner())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
        else {
            return Ok(None);
        };
        let rows = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(id.into_inner()))
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let entries = rows.iter().map(entry_to_domain).collect();
        Ok(Some((header_to_domain(&header), entries)))
    }

    /// Submits a new voucher request: runs every admission rule from spec
    /// 4.1 against already-loaded accounts/dimensions/periods, then
    /// inserts the header (status `draft`) and its entry lines. Honors
    /// idempotency: a request carrying a `source_event_id` already seen
    /// returns the prior voucher's id unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the first admission-rule violation, or
    /// [`LedgerError::Database`] on a persistence failure.
    #[tracing::instrument(skip(self, request, accounts))]
    pub async fn submit(
        &self,
        request: VoucherRequest,
        accounts: &AccountRepository<'_>,
        dimensions: &super::dimension::DimensionRepository<'_>,
        period_status: impl Fn(&str) -> Option<zeltra_core::period::PeriodStatus>,
    ) -> Result<VoucherId, LedgerError> {
        if let Some(event_id) = &request.source_event_id {
            if let Some(existing) = voucher_events::Entity::find_by_id(event_id.clone())
                .one(self.db)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?
            {
                return Ok(VoucherId::from_uuid(existing.voucher_id));
            }
        }

        voucher_rules::validate_balance(&request.entries)?;
        for entry in &request.entries {
            let account = accounts
                .find(&entry.account_code)
                .await?
                .ok_or_else(|| LedgerError::AccountNotFound(entry.account_code.clone()))?;
            if !account.enabled {
                return Err(LedgerError::AccountDisabled(entry.account_code.clone()));
            }
            for (dim_type, id) in [
                (zeltra_core::coa::DimensionType::Department, entry.dimensions.department),
                (zeltra_core::coa::DimensionType::Project, entry.dimensions.project),
                (zeltra_core::coa::DimensionType::Customer, entry.dimensions.customer),
                (zeltra_core::coa::DimensionType::Supplier, entry.dimensions.supplier),
                (zeltra_core::coa::DimensionType::Employee, entry.dimensions.employee),
            ] {
                if id.is_none() {
                    continue;
                }
                match dimensions.resolve_enabled(dim_type, dim_uuid(id)).await? {
                    None => return Err(LedgerError::DimensionNotFound(id.to_string())),
                    Some(false) => return Err(LedgerError::DimensionDisabled(id.to_string())),
                    Some(true) => {}
                }
            }
        }
        let period = Voucher::derive_period(request.posting_date);
        voucher_rules::validate_period_admission(&period, request.entry_type, &period_status)?;

        let voucher_id = VoucherId::new();
        let txn = self.db.begin().await.map_err(|e| LedgerError::Database(e.to_string()))?;

        let header = vouchers::ActiveModel {
            id: Set(voucher_id.into_inner()),
            voucher_no: Set(None),
            date: Set(request.posting_date),
            period: Set(period),
            description: Set(request.description.clone()),
            status: Set(status_str(VoucherStatus::Draft).to_string()),
            entry_type: Set(entry_kind_str(request.entry_type).to_string()),
            source_template: Set(request.source_template.clone()),
            source_event_id: Set(request.source_event_id.clone()),
            void_reason: Set(None),
            created_at: Set(Utc::now().into()),
            confirmed_at: Set(None),
            voided_at: Set(None),
        };
        header.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        for (line_no, entry) in request.entries.iter().enumerate() {
            let account_name = accounts
                .find(&entry.account_code)
                .await?
                .map_or_else(String::new, |a| a.name);
            let row = voucher_entries::ActiveModel {
                id: Set(Uuid::now_v7()),
                voucher_id: Set(voucher_id.into_inner()),
                line_no: Set(i32::try_from(line_no + 1).unwrap_or(i32::MAX)),
                account_code: Set(entry.account_code.clone()),
                account_name: Set(account_name),
                description: Set(entry.description.clone()),
                debit_amount: Set(entry.debit),
                credit_amount: Set(entry.credit),
                currency_code: Set(entry.currency.map(|c| c.as_str().to_string())),
                fx_rate: Set(entry.fx_rate),
                foreign_debit: Set(entry.foreign_debit),
                foreign_credit: Set(entry.foreign_credit),
                dept_id: Set(dim_uuid(entry.dimensions.department)),
                project_id: Set(dim_uuid(entry.dimensions.project)),
                customer_id: Set(dim_uuid(entry.dimensions.customer)),
                supplier_id: Set(dim_uuid(entry.dimensions.supplier)),
                employee_id: Set(dim_uuid(entry.dimensions.employee)),
            };
            row.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        }

        if let Some(event_id) = &request.source_event_id {
            let event = voucher_events::ActiveModel {
                event_id: Set(event_id.clone()),
                template_code: Set(request.source_template.clone().unwrap_or_default()),
                voucher_id: Set(voucher_id.into_inner()),
            };
            event.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        }

        txn.commit().await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(voucher_id = %voucher_id, "voucher submitted as draft");
        Ok(voucher_id)
    }

    /// `draft -> reviewed`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VoucherNotFound`],
    /// [`LedgerError::IllegalTransition`], or [`LedgerError::Database`].
    pub async fn review(&self, id: VoucherId) -> Result<(), LedgerError> {
        self.transition(id, VoucherStatus::Reviewed, |status| {
            voucher_rules::validate_review(id, status)
        })
        .await
    }

    /// `reviewed -> draft`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VoucherNotFound`],
    /// [`LedgerError::IllegalTransition`], or [`LedgerError::Database`].
    pub async fn unreview(&self, id: VoucherId) -> Result<(), LedgerError> {
        self.transition(id, VoucherStatus::Draft, |status| {
            voucher_rules::validate_unreview(id, status)
        })
        .await
    }

    /// `draft -> deleted`. Draft vouchers leave no trace once deleted —
    /// only a confirmed voucher's audit trail is permanent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VoucherNotFound`],
    /// [`LedgerError::IllegalTransition`], or [`LedgerError::Database`].
    pub async fn delete(&self, id: VoucherId) -> Result<(), LedgerError> {
        let header = vouchers::Entity::find_by_id(id.into_inner())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::VoucherNotFound(id))?;
        voucher_rules::validate_delete(id, parse_status(&header.status))?;
        vouchers::Entity::delete_by_id(id.into_inner())
            .exec(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn transition(
        &self,
        id: VoucherId,
        new_status: VoucherStatus,
        validate: impl FnOnce(VoucherStatus) -> Result<(), LedgerError>,
    ) -> Result<(), LedgerError> {
        let header = vouchers::Entity::find_by_id(id.into_inner())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::VoucherNotFound(id))?;
        validate(parse_status(&header.status))?;
        let mut model: vouchers::ActiveModel = header.into();
        model.status = Set(status_str(new_status).to_string());
        model.update(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(voucher_id = %id, new_status = status_str(new_status), "voucher transitioned");
        Ok(())
    }

    /// `reviewed -> confirmed`: assigns the voucher number (`seq` is the
    /// caller's already-locked per-day sequence, per
    /// [`format_voucher_no`]'s documented contract) and applies every
    /// entry to the balance index inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VoucherNotReviewed`],
    /// [`LedgerError::VoucherNotFound`], [`LedgerError::AccountNotFound`],
    /// or [`LedgerError::Database`].
    #[tracing::instrument(skip(self, balances))]
    pub async fn confirm(
        &self,
        id: VoucherId,
        seq: u32,
        balances: &super::balance::BalanceRepository<'_>,
        accounts: &AccountRepository<'_>,
    ) -> Result<String, LedgerError> {
        let header = vouchers::Entity::find_by_id(id.into_inner())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::VoucherNotFound(id))?;
        voucher_rules::validate_confirm(id, parse_status(&header.status))?;

        let voucher_no = format_voucher_no(header.date, seq);
        let entries = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(id.into_inner()))
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let txn = self.db.begin().await.map_err(|e| LedgerError::Database(e.to_string()))?;
        for row in &entries {
            let account = accounts
                .find(&row.account_code)
                .await?
                .ok_or_else(|| LedgerError::AccountNotFound(row.account_code.clone()))?;
            balances
                .apply_entry(&txn, &account, &header.period, &entry_to_domain(row))
                .await?;
        }

        let mut model: vouchers::ActiveModel = header.into();
        model.status = Set(status_str(VoucherStatus::Confirmed).to_string());
        model.voucher_no = Set(Some(voucher_no.clone()));
        model.confirmed_at = Set(Some(Utc::now().into()));
        model.update(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        txn.commit().await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(voucher_id = %id, voucher_no = %voucher_no, "voucher confirmed");
        Ok(voucher_no)
    }

    /// `confirmed -> voided`: synthesizes a red-letter reversal voucher
    /// (debit/credit swapped on every line), applies the reversal to the
    /// balance index, and records the `void_vouchers` link.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VoidConfirmed`],
    /// [`LedgerError::VoucherNotFound`], or [`LedgerError::Database`].
    #[tracing::instrument(skip(self, balances))]
    pub async fn void(
        &self,
        id: VoucherId,
        reason: String,
        balances: &super::balance::BalanceRepository<'_>,
        accounts: &AccountRepository<'_>,
    ) -> Result<VoucherId, LedgerError> {
        let header = vouchers::Entity::find_by_id(id.into_inner())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::VoucherNotFound(id))?;
        voucher_rules::validate_void(id, parse_status(&header.status))?;

        let entries = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::VoucherId.eq(id.into_inner()))
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let reversal_id = VoucherId::new();
        let txn = self.db.begin().await.map_err(|e| LedgerError::Database(e.to_string()))?;

        let reversal_header = vouchers::ActiveModel {
            id: Set(reversal_id.into_inner()),
            voucher_no: Set(None),
            date: Set(header.date),
            period: Set(header.period.clone()),
            description: Set(format!("Void of {}: {reason}", header.voucher_no.clone().unwrap_or_default())),
            status: Set(status_str(VoucherStatus::Confirmed).to_string()),
            entry_type: Set(header.entry_type.clone()),
            source_template: Set(None),
            source_event_id: Set(None),
            void_reason: Set(Some(reason.clone())),
            created_at: Set(Utc::now().into()),
            confirmed_at: Set(Some(Utc::now().into())),
            voided_at: Set(None),
        };
        reversal_header.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        for row in &entries {
            let original = entry_to_domain(row);
            let reversed = original.reversed(VoucherEntryId::new(), reversal_id);
            let account = accounts
                .find(&reversed.account_code)
                .await?
                .ok_or_else(|| LedgerError::AccountNotFound(reversed.account_code.clone()))?;

            let reversal_row = voucher_entries::ActiveModel {
                id: Set(reversed.id.into_inner()),
                voucher_id: Set(reversal_id.into_inner()),
                line_no: Set(row.line_no),
                account_code: Set(reversed.account_code.clone()),
                account_name: Set(row.account_name.clone()),
                description: Set(reversed.description.clone()),
                debit_amount: Set(reversed.debit),
                credit_amount: Set(reversed.credit),
                currency_code: Set(row.currency_code.clone()),
                fx_rate: Set(reversed.fx_rate),
                foreign_debit: Set(reversed.foreign_debit),
                foreign_credit: Set(reversed.foreign_credit),
                dept_id: Set(row.dept_id),
                project_id: Set(row.project_id),
                customer_id: Set(row.customer_id),
                supplier_id: Set(row.supplier_id),
                employee_id: Set(row.employee_id),
            };
            reversal_row.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;
            balances.apply_entry(&txn, &account, &header.period, &reversed).await?;
        }

        let link = void_vouchers::ActiveModel {
            id: Set(Uuid::now_v7()),
            original_voucher_id: Set(id.into_inner()),
            void_voucher_id: Set(reversal_id.into_inner()),
            reason: Set(reason),
            created_at: Set(Utc::now().into()),
        };
        link.insert(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut original_model: vouchers::ActiveModel = header.into();
        original_model.status = Set(status_str(VoucherStatus::Voided).to_string());
        original_model.voided_at = Set(Some(Utc::now().into()));
        original_model.update(&txn).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        txn.commit().await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::warn!(voucher_id = %id, reversal_id = %reversal_id, "voucher voided");
        Ok(reversal_id)
    }

    /// The next unused per-day sequence number for `date`, for
    /// [`format_voucher_no`]. Callers must run this inside the same
    /// transaction as `confirm`'s row lock to stay gap-free under
    /// concurrent confirmation (spec 5).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn next_sequence_for(&self, date: chrono::NaiveDate) -> Result<u32, LedgerError> {
        let prefix = format!("V{}", date.format("%Y%m%d"));
        let count = vouchers::Entity::find()
            .filter(vouchers::Column::VoucherNo.starts_with(&prefix))
            .count(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX) + 1)
    }

    /// Loads every confirmed (or voided-reversal) entry for `period`, in
    /// voucher-number order, for [`rebuild_balances`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn confirmed_entries_for_period(
        &self,
        period: &str,
    ) -> Result<Vec<(String, VoucherEntry)>, LedgerError> {
        let headers = vouchers::Entity::find()
            .filter(vouchers::Column::Period.eq(period))
            .filter(vouchers::Column::Status.is_in(["confirmed", "voided"]))
            .order_by_asc(vouchers::Column::VoucherNo)
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut out = Vec::new();
        for header in &headers {
            let rows = voucher_entries::Entity::find()
                .filter(voucher_entries::Column::VoucherId.eq(header.id))
                .order_by_asc(voucher_entries::Column::LineNo)
                .all(self.db)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;
            for row in &rows {
                out.push((header.period.clone(), entry_to_domain(row)));
            }
        }
        Ok(out)
    }
}

/// Rebuilds the full balance index for one period from its confirmed
/// (plus void-reversal) entries, delegating to
/// [`zeltra_core::ledger::rebuild`]. Exposed at module level since it
/// needs both the voucher and account repositories but writes nothing
/// itself — callers persist the result through
/// [`super::balance::BalanceRepository`].
///
/// # Errors
///
/// Returns [`LedgerError::Database`] on a persistence failure loading the
/// source entries or accounts.
pub async fn rebuild_period<'a>(
    vouchers: &VoucherRepository<'a>,
    accounts: &AccountRepository<'a>,
    period: &str,
) -> Result<Vec<zeltra_core::ledger::Balance>, LedgerError> {
    let entries = vouchers.confirmed_entries_for_period(period).await?;
    let mut cache: std::collections::HashMap<String, Option<Account>> = std::collections::HashMap::new();
    for (_, entry) in &entries {
        if !cache.contains_key(&entry.account_code) {
            let account = accounts.find(&entry.account_code).await?;
            cache.insert(entry.account_code.clone(), account);
        }
    }
    Ok(rebuild_balances(&entries, |code| cache.get(code).cloned().flatten()))
}
