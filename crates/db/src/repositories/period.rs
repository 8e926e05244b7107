//! Period & Closing Engine repository (C4): `periods`, `closing_templates`,
//! `voucher_templates`, plus the close/reopen orchestration that ties the
//! pure planning functions in [`zeltra_core::period::closing`] to the
//! voucher store and balance index.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use zeltra_core::ledger::LedgerError;
use zeltra_core::period::closing::{build_closing_plan, is_closing_voucher, ClosingSource, ReopenPlan};
use zeltra_core::period::{ClosingTemplate, Period, PeriodStatus, VoucherTemplate};

use crate::entities::period::{closing_templates, periods, voucher_templates};

use super::balance::BalanceRepository;
use super::voucher::VoucherRepository;

fn status_str(status: PeriodStatus) -> &'static str {
    match status {
        PeriodStatus::Open => "open",
        PeriodStatus::Adjustment => "adjustment",
        PeriodStatus::Closed => "closed",
    }
}

fn parse_status(s: &str) -> PeriodStatus {
    match s {
        "adjustment" => PeriodStatus::Adjustment,
        "closed" => PeriodStatus::Closed,
        _ => PeriodStatus::Open,
    }
}

fn to_domain(model: periods::Model) -> Period {
    Period {
        period: model.period,
        status: parse_status(&model.status),
        opened_at: model.opened_at.map(|d| d.with_timezone(&Utc)),
        closed_at: model.closed_at.map(|d| d.with_timezone(&Utc)),
    }
}

/// Repository for the `periods` table and the close/reopen orchestration.
pub struct PeriodRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PeriodRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads one period by key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn find(&self, period: &str) -> Result<Option<Period>, LedgerError> {
        periods::Entity::find_by_id(period.to_string())
            .one(self.db)
            .await
            .map(|opt| opt.map(to_domain))
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Loads every period's status, the shape
    /// [`zeltra_core::ledger::voucher::validate_period_admission`]'s lookup
    /// closure needs once preloaded into a plain map.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn status_map(&self) -> Result<HashMap<String, PeriodStatus>, LedgerError> {
        periods::Entity::find()
            .all(self.db)
            .await
            .map(|rows| rows.into_iter().map(|r| (r.period, parse_status(&r.status))).collect())
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Opens a new period (first use of a `YYYY-MM` key). A no-op if the
    /// period already exists.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    #[tracing::instrument(skip(self))]
    pub async fn open(&self, period: &str) -> Result<(), LedgerError> {
        if self.find(period).await?.is_some() {
            return Ok(());
        }
        let model = periods::ActiveModel {
            period: Set(period.to_string()),
            status: Set(status_str(PeriodStatus::Open).to_string()),
            opened_at: Set(Some(Utc::now().into())),
            closed_at: Set(None),
        };
        model.insert(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(period, "period opened");
        Ok(())
    }

    /// `open -> adjustment`: the manual step preceding close (spec 4.3).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodClosed`] if the period is not open, or
    /// [`LedgerError::Database`] on a persistence failure.
    pub async fn enter_adjustment(&self, period: &str) -> Result<(), LedgerError> {
        let row = self.require(period).await?;
        if !parse_status(&row.status).can_enter_adjustment() {
            return Err(LedgerError::PeriodClosed(period.to_string()));
        }
        let mut model: periods::ActiveModel = row.into();
        model.status = Set(status_str(PeriodStatus::Adjustment).to_string());
        model.update(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    /// `adjustment -> closed`: evaluates every active closing template
    /// against `sources`, submits/reviews/confirms the resulting vouchers,
    /// then rolls the balance index forward into `next_period` (spec 4.3's
    /// close step).
    ///
    /// # Errors
    ///
    /// Propagates the first template evaluation error, any admission-rule
    /// violation from confirming a closing voucher, or
    /// [`LedgerError::Database`].
    #[tracing::instrument(skip(self, sources, vouchers, accounts, balances))]
    #[allow(clippy::too_many_arguments)]
    pub async fn close(
        &self,
        period: &str,
        next_period: &str,
        posting_date: NaiveDate,
        templates: &[ClosingTemplate],
        sources: &[ClosingSource],
        vouchers: &VoucherRepository<'_>,
        accounts: &super::account::AccountRepository<'_>,
        balances: &BalanceRepository<'_>,
    ) -> Result<Vec<String>, LedgerError> {
        let row = self.require(period).await?;
        if !parse_status(&row.status).can_close() {
            return Err(LedgerError::PeriodClosed(period.to_string()));
        }

        let plan = build_closing_plan(templates, period, posting_date, sources)?;

        let status_map = self.status_map().await?;
        let mut voucher_nos = Vec::with_capacity(plan.vouchers.len());
        for request in plan.vouchers {
            let id = vouchers
                .submit(request, accounts, &super::dimension::DimensionRepository::new(self.db), |p| {
                    status_map.get(p).copied()
                })
                .await?;
            vouchers.review(id).await?;
            let seq = vouchers.next_sequence_for(posting_date).await?;
            let voucher_no = vouchers.confirm(id, seq, balances, accounts).await?;
            voucher_nos.push(voucher_no);
        }

        balances.roll_period(self.db, period, next_period).await?;

        let mut model: periods::ActiveModel = row.into();
        model.status = Set(status_str(PeriodStatus::Closed).to_string());
        model.closed_at = Set(Some(Utc::now().into()));
        model.update(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(period, voucher_count = voucher_nos.len(), "period closed");
        Ok(voucher_nos)
    }

    /// `closed -> open`: voids every closing voucher produced at close time
    /// and reports whether the following period already had activity of
    /// its own (spec 4.3's reopen step; the caller decides how to carry an
    /// adjustment forward when it did).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodClosed`] (repurposed here to mean "not
    /// currently closed") if reopen is not legal, or [`LedgerError::Database`].
    pub async fn reopen(
        &self,
        period: &str,
        next_period: &str,
        vouchers: &VoucherRepository<'_>,
        accounts: &super::account::AccountRepository<'_>,
        balances: &BalanceRepository<'_>,
    ) -> Result<ReopenPlan, LedgerError> {
        let row = self.require(period).await?;
        if !parse_status(&row.status).can_reopen() {
            return Err(LedgerError::PeriodClosed(period.to_string()));
        }

        let headers = crate::entities::voucher::vouchers::Entity::find()
            .filter(crate::entities::voucher::vouchers::Column::Period.eq(period))
            .filter(crate::entities::voucher::vouchers::Column::Status.eq("confirmed"))
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut vouchers_to_void = Vec::new();
        for header in &headers {
            let voucher = zeltra_core::ledger::Voucher {
                id: zeltra_shared::types::VoucherId::from_uuid(header.id),
                voucher_no: header.voucher_no.clone(),
                posting_date: header.date,
                period: header.period.clone(),
                description: header.description.clone(),
                status: zeltra_core::ledger::VoucherStatus::Confirmed,
                entry_type: if header.entry_type == "adjustment" {
                    zeltra_core::ledger::EntryKind::Adjustment
                } else {
                    zeltra_core::ledger::EntryKind::Normal
                },
                source_template: header.source_template.clone(),
                source_event_id: header.source_event_id.clone(),
                void_of: None,
                created_at: header.created_at.with_timezone(&Utc),
                confirmed_at: header.confirmed_at.map(|d| d.with_timezone(&Utc)),
                voided_at: None,
            };
            if is_closing_voucher(&voucher) {
                vouchers
                    .void(voucher.id, format!("period {period} reopened"), balances, accounts)
                    .await?;
                vouchers_to_void.push(voucher.id);
            }
        }

        let next_period_has_activity = !crate::entities::voucher::vouchers::Entity::find()
            .filter(crate::entities::voucher::vouchers::Column::Period.eq(next_period))
            .filter(crate::entities::voucher::vouchers::Column::Status.eq("confirmed"))
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .is_empty();

        let mut model: periods::ActiveModel = row.into();
        model.status = Set(status_str(PeriodStatus::Open).to_string());
        model.closed_at = Set(None);
        model.update(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;

        tracing::warn!(period, "period reopened");
        Ok(ReopenPlan::new(vouchers_to_void, next_period_has_activity))
    }

    async fn require(&self, period: &str) -> Result<periods::Model, LedgerError> {
        periods::Entity::find_by_id(period.to_string())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or_else(|| LedgerError::PeriodClosed(period.to_string()))
    }
}

/// Repository for the `closing_templates` table.
pub struct ClosingTemplateRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClosingTemplateRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every active closing template.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure, or
    /// propagates a malformed `rule_json` column as a database error.
    pub async fn list_active(&self) -> Result<Vec<ClosingTemplate>, LedgerError> {
        let rows = closing_templates::Entity::find()
            .filter(closing_templates::Column::IsActive.eq(true))
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        rows.into_iter()
            .map(|row| {
                let rule = serde_json::from_value(row.rule_json)
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                Ok(ClosingTemplate { code: row.code, name: row.name, rule, is_active: row.is_active })
            })
            .collect()
    }

    /// Inserts or replaces a closing template.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn upsert(&self, template: &ClosingTemplate) -> Result<(), LedgerError> {
        use sea_orm::sea_query::OnConflict;
        let rule_json = serde_json::to_value(&template.rule).map_err(|e| LedgerError::Database(e.to_string()))?;
        let model = closing_templates::ActiveModel {
            code: Set(template.code.clone()),
            name: Set(template.name.clone()),
            rule_json: Set(rule_json),
            is_active: Set(template.is_active),
            created_at: Set(Utc::now().into()),
        };
        closing_templates::Entity::insert(model)
            .on_conflict(
                OnConflict::column(closing_templates::Column::Code)
                    .update_columns([
                        closing_templates::Column::Name,
                        closing_templates::Column::RuleJson,
                        closing_templates::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Repository for the `voucher_templates` table.
pub struct VoucherTemplateRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VoucherTemplateRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads one active voucher template by code.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure or a
    /// malformed `rule_json` column.
    pub async fn find_active(&self, code: &str) -> Result<Option<VoucherTemplate>, LedgerError> {
        let row = voucher_templates::Entity::find_by_id(code.to_string())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let Some(row) = row.filter(|r| r.is_active) else {
            return Ok(None);
        };
        let entries = serde_json::from_value(row.rule_json).map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(Some(VoucherTemplate { code: row.code, name: row.name, entries, is_active: row.is_active }))
    }

    /// Inserts or replaces a voucher template.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn upsert(&self, template: &VoucherTemplate) -> Result<(), LedgerError> {
        use sea_orm::sea_query::OnConflict;
        let rule_json = serde_json::to_value(&template.entries).map_err(|e| LedgerError::Database(e.to_string()))?;
        let model = voucher_templates::ActiveModel {
            code: Set(template.code.clone()),
            name: Set(template.name.clone()),
            rule_json: Set(rule_json),
            is_active: Set(template.is_active),
            created_at: Set(Utc::now().into()),
        };
        voucher_templates::Entity::insert(model)
            .on_conflict(
                OnConflict::column(voucher_templates::Column::Code)
                    .update_columns([
                        voucher_templates::Column::Name,
                        voucher_templates::Column::RuleJson,
                        voucher_templates::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }
}
