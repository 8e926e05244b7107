//! Period & Closing Engine endpoints (C4): open/enter-adjustment/close/reopen.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use zeltra_core::ledger::LedgerError;
use zeltra_core::period::closing::{raw_net_change, ClosingSource};
use zeltra_core::period::Period;
use zeltra_db::{AccountRepository, BalanceRepository, ClosingTemplateRepository, PeriodRepository, VoucherRepository};

use crate::error::ApiError;
use crate::AppState;

async fn get_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Period>, ApiError> {
    PeriodRepository::new(&state.db)
        .find(&period)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Ledger(LedgerError::PeriodClosed(period)))
}

async fn open_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<()>, ApiError> {
    PeriodRepository::new(&state.db).open(&period).await?;
    Ok(Json(()))
}

async fn enter_adjustment(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<()>, ApiError> {
    PeriodRepository::new(&state.db).enter_adjustment(&period).await?;
    Ok(Json(()))
}

/// Aggregates every balance row of `period` into one [`ClosingSource`] per
/// account, since the balance index is keyed at the (account, dimensions)
/// granularity but closing templates operate on whole accounts.
async fn closing_sources(
    accounts: &AccountRepository<'_>,
    balances: &BalanceRepository<'_>,
    period: &str,
) -> Result<Vec<ClosingSource>, LedgerError> {
    let rows = balances.list_for_period(period).await?;
    let all_accounts = accounts.list_all().await?;
    let lookup: BTreeMap<&str, _> = all_accounts.iter().map(|a| (a.code.as_str(), a)).collect();

    let mut net_by_account: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in &rows {
        if !lookup.contains_key(row.key.account_code.as_str()) {
            continue;
        }
        *net_by_account.entry(row.key.account_code.clone()).or_default() +=
            raw_net_change(row.debit_total, row.credit_total);
    }

    Ok(net_by_account
        .into_iter()
        .filter_map(|(code, net_change)| {
            lookup.get(code.as_str()).map(|a| ClosingSource { account: (*a).clone(), net_change })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ClosePeriodRequest {
    next_period: String,
    posting_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ClosePeriodResponse {
    closing_voucher_numbers: Vec<String>,
}

async fn close_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Json(body): Json<ClosePeriodRequest>,
) -> Result<Json<ClosePeriodResponse>, ApiError> {
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);
    let vouchers = VoucherRepository::new(&state.db);
    let periods = PeriodRepository::new(&state.db);
    let templates = ClosingTemplateRepository::new(&state.db).list_active().await?;
    let sources = closing_sources(&accounts, &balances, &period).await?;

    let closing_voucher_numbers = periods
        .close(&period, &body.next_period, body.posting_date, &templates, &sources, &vouchers, &accounts, &balances)
        .await?;
    Ok(Json(ClosePeriodResponse { closing_voucher_numbers }))
}

#[derive(Debug, Deserialize)]
struct ReopenPeriodRequest {
    next_period: String,
}

#[derive(Debug, Serialize)]
struct ReopenPeriodResponse {
    voided_closing_vouchers: Vec<String>,
    next_period_has_activity: bool,
}

async fn reopen_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Json(body): Json<ReopenPeriodRequest>,
) -> Result<Json<ReopenPeriodResponse>, ApiError> {
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);
    let vouchers = VoucherRepository::new(&state.db);
    let periods = PeriodRepository::new(&state.db);

    let plan = periods.reopen(&period, &body.next_period, &vouchers, &accounts, &balances).await?;
    Ok(Json(ReopenPeriodResponse {
        voided_closing_vouchers: plan.vouchers_to_void.iter().map(ToString::to_string).collect(),
        next_period_has_activity: plan.next_period_has_activity,
    }))
}

/// Routes mounted under `/periods`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/periods/{period}", axum::routing::get(get_period))
        .route("/periods/{period}/open", post(open_period))
        .route("/periods/{period}/adjustment", post(enter_adjustment))
        .route("/periods/{period}/close", post(close_period))
        .route("/periods/{period}/reopen", post(reopen_period))
}
