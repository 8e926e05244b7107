//! Chart-of-accounts endpoints (C1).

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use zeltra_core::coa::{Account, AccountType, CashFlowCategory, NormalSide};
use zeltra_db::AccountRepository;

use crate::error::ApiError;
use crate::AppState;

/// Request body for `POST /accounts`.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Stable hierarchical code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Fundamental account type.
    pub account_type: AccountType,
    /// Normal side; defaults to the account type's default when omitted.
    pub normal_side: Option<NormalSide>,
    /// Cash-flow classification; defaults to `none`.
    #[serde(default)]
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Parent account code, if any.
    pub parent_code: Option<String>,
}

async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let repo = AccountRepository::new(&state.db);
    Ok(Json(repo.list_all().await?))
}

async fn get_account(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let repo = AccountRepository::new(&state.db);
    repo.find(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Ledger(zeltra_core::ledger::LedgerError::AccountNotFound(code)))
}

/// Walks the `parent_code` chain to depth, so a new account's `level` is
/// always one past its true ancestor chain rather than a fixed 0/1.
async fn depth_of(repo: &AccountRepository<'_>, parent_code: &Option<String>) -> Result<i32, ApiError> {
    let mut level = 0;
    let mut current = parent_code.clone();
    while let Some(code) = current {
        level += 1;
        current = repo.find(&code).await?.and_then(|a| a.parent_code);
    }
    Ok(level)
}

async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    let repo = AccountRepository::new(&state.db);
    let parent = match &body.parent_code {
        Some(code) => repo.find(code).await?,
        None => None,
    };
    let level = depth_of(&repo, &body.parent_code).await?;
    let account = Account {
        code: body.code,
        name: body.name,
        account_type: body.account_type,
        normal_side: body.normal_side.unwrap_or_else(|| body.account_type.default_normal_side()),
        cash_flow_category: body.cash_flow_category.unwrap_or(CashFlowCategory::None),
        parent_code: body.parent_code,
        enabled: true,
        system_seeded: false,
        revaluable: false,
    };
    repo.create(&account, parent.as_ref(), level)
        .await
        .map_err(|e| ApiError::Ledger(zeltra_core::ledger::LedgerError::Database(e.to_string())))?;
    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct SetEnabledRequest {
    enabled: bool,
}

async fn set_enabled(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<SetEnabledRequest>,
) -> Result<Json<()>, ApiError> {
    let repo = AccountRepository::new(&state.db);
    repo.set_enabled(&code, body.enabled).await?;
    Ok(Json(()))
}

/// Routes mounted under `/accounts`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{code}", get(get_account))
        .route("/accounts/{code}/enabled", patch(set_enabled))
}
