//! Voucher store endpoints (C2): submit/review/unreview/confirm/void/delete.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_core::coa::DimensionKey;
use zeltra_core::ledger::{EntryKind, LedgerError, Voucher, VoucherEntry, VoucherEntryRequest, VoucherRequest};
use zeltra_db::{AccountRepository, BalanceRepository, PeriodRepository, VoucherRepository};
use zeltra_shared::types::{Currency, VoucherId};

use crate::error::ApiError;
use crate::AppState;

/// Request body for one entry line of `POST /vouchers`.
#[derive(Debug, Deserialize)]
pub struct VoucherEntryBody {
    /// Account code.
    pub account_code: String,
    /// Line description.
    pub description: Option<String>,
    /// Debit amount, >= 0.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount, >= 0.
    #[serde(default)]
    pub credit: Decimal,
    /// Foreign currency code, if the line carries one.
    pub currency: Option<Currency>,
    /// Exchange rate, required when `currency` is set.
    pub fx_rate: Option<Decimal>,
    /// Foreign debit, required when `currency` is set.
    pub foreign_debit: Option<Decimal>,
    /// Foreign credit, required when `currency` is set.
    pub foreign_credit: Option<Decimal>,
    /// Department dimension value id, if tagged.
    pub department_id: Option<uuid::Uuid>,
    /// Project dimension value id, if tagged.
    pub project_id: Option<uuid::Uuid>,
    /// Customer dimension value id, if tagged.
    pub customer_id: Option<uuid::Uuid>,
    /// Supplier dimension value id, if tagged.
    pub supplier_id: Option<uuid::Uuid>,
    /// Employee dimension value id, if tagged.
    pub employee_id: Option<uuid::Uuid>,
}

impl VoucherEntryBody {
    fn into_request(self) -> VoucherEntryRequest {
        use zeltra_shared::types::DimensionValueId;
        VoucherEntryRequest {
            account_code: self.account_code,
            description: self.description,
            debit: self.debit,
            credit: self.credit,
            currency: self.currency,
            fx_rate: self.fx_rate,
            foreign_debit: self.foreign_debit,
            foreign_credit: self.foreign_credit,
            dimensions: DimensionKey {
                department: self.department_id.map_or(DimensionValueId::none(), DimensionValueId::from_uuid),
                project: self.project_id.map_or(DimensionValueId::none(), DimensionValueId::from_uuid),
                customer: self.customer_id.map_or(DimensionValueId::none(), DimensionValueId::from_uuid),
                supplier: self.supplier_id.map_or(DimensionValueId::none(), DimensionValueId::from_uuid),
                employee: self.employee_id.map_or(DimensionValueId::none(), DimensionValueId::from_uuid),
            },
        }
    }
}

/// Request body for `POST /vouchers`.
#[derive(Debug, Deserialize)]
pub struct SubmitVoucherRequest {
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Description.
    pub description: String,
    /// `normal` (default) or `adjustment`.
    #[serde(default)]
    pub entry_type: EntryTypeBody,
    /// Entry lines.
    pub entries: Vec<VoucherEntryBody>,
    /// Idempotency key for event-sourced submission.
    pub source_event_id: Option<String>,
}

/// Wire-level entry-kind discriminant.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTypeBody {
    #[default]
    Normal,
    Adjustment,
}

impl From<EntryTypeBody> for EntryKind {
    fn from(value: EntryTypeBody) -> Self {
        match value {
            EntryTypeBody::Normal => Self::Normal,
            EntryTypeBody::Adjustment => Self::Adjustment,
        }
    }
}

#[derive(Debug, Serialize)]
struct VoucherResponse {
    voucher: Voucher,
    entries: Vec<VoucherEntry>,
}

async fn submit_voucher(
    State(state): State<AppState>,
    Json(body): Json<SubmitVoucherRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = VoucherRequest {
        posting_date: body.posting_date,
        description: body.description,
        entry_type: body.entry_type.into(),
        entries: body.entries.into_iter().map(VoucherEntryBody::into_request).collect(),
        source_template: None,
        source_event_id: body.source_event_id,
    };

    let accounts = AccountRepository::new(&state.db);
    let dimensions = zeltra_db::DimensionRepository::new(&state.db);
    let periods = PeriodRepository::new(&state.db);
    let status_map = periods.status_map().await?;
    let vouchers = VoucherRepository::new(&state.db);

    let id = vouchers
        .submit(request, &accounts, &dimensions, |p| status_map.get(p).copied())
        .await?;
    Ok(Json(serde_json::json!({ "id": id.to_string() })))
}

async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Json<VoucherResponse>, ApiError> {
    let vouchers = VoucherRepository::new(&state.db);
    let (voucher, entries) = vouchers
        .find(id)
        .await?
        .ok_or(LedgerError::VoucherNotFound(id))?;
    Ok(Json(VoucherResponse { voucher, entries }))
}

async fn review_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Json<()>, ApiError> {
    VoucherRepository::new(&state.db).review(id).await?;
    Ok(Json(()))
}

async fn unreview_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Json<()>, ApiError> {
    VoucherRepository::new(&state.db).unreview(id).await?;
    Ok(Json(()))
}

async fn delete_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Json<()>, ApiError> {
    VoucherRepository::new(&state.db).delete(id).await?;
    Ok(Json(()))
}

async fn confirm_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let vouchers = VoucherRepository::new(&state.db);
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);

    let (header, _) = vouchers.find(id).await?.ok_or(LedgerError::VoucherNotFound(id))?;
    let seq = vouchers.next_sequence_for(header.posting_date).await?;
    let voucher_no = vouchers.confirm(id, seq, &balances, &accounts).await?;
    Ok(Json(serde_json::json!({ "voucher_no": voucher_no })))
}

#[derive(Debug, Deserialize)]
struct VoidRequest {
    reason: String,
}

async fn void_voucher(
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
    Json(body): Json<VoidRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let vouchers = VoucherRepository::new(&state.db);
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);

    let reversal_id = vouchers.void(id, body.reason, &balances, &accounts).await?;
    Ok(Json(serde_json::json!({ "reversal_id": reversal_id.to_string() })))
}

/// Routes mounted under `/vouchers`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", post(submit_voucher))
        .route("/vouchers/{id}", get(get_voucher).delete(delete_voucher))
        .route("/vouchers/{id}/review", post(review_voucher))
        .route("/vouchers/{id}/unreview", post(unreview_voucher))
        .route("/vouchers/{id}/confirm", post(confirm_voucher))
        .route("/vouchers/{id}/void", post(void_voucher))
}
