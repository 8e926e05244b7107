//! Statement & Reconciliation Engine endpoints (C6): ledger-mode rendering
//! and the model-mode calculator's `run_once`/`iterate`/`scenario`/
//! `diagnose`/`explain` sub-modes.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use zeltra_core::statement::diagnose::{diagnose, DiagnosticReport};
use zeltra_core::statement::{
    explain, iterate, run_once, scenario_sweep, DriverRecord, ExplainNode, IterationOutcome,
    StatementMapping, StatementReport,
};
use zeltra_db::{AccountRepository, BalanceRepository, ReportRepository};

use crate::error::ApiError;
use crate::AppState;

const DEFAULT_CASH_PREFIX: &str = "1001";
const DEFAULT_TOLERANCE: Decimal = zeltra_core::statement::model_mode::DEFAULT_TOLERANCE;
const DEFAULT_MAX_ITERATIONS: u32 = 10;

#[derive(Debug, Deserialize)]
struct LedgerQuery {
    #[serde(default)]
    cash_prefix: Option<String>,
}

async fn render_ledger(
    State(state): State<AppState>,
    axum::extract::Path(period): axum::extract::Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<StatementReport>, ApiError> {
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);
    let report_repo = ReportRepository::new(&accounts, &balances);
    let mapping = StatementMapping::standard();
    let cash_prefix = query.cash_prefix.as_deref().unwrap_or(DEFAULT_CASH_PREFIX);
    let report = report_repo.render(&period, &mapping, cash_prefix).await?;
    Ok(Json(report))
}

async fn run_once_handler(Json(driver): Json<DriverRecord>) -> Json<zeltra_core::statement::ReconciliationResult> {
    Json(run_once(&driver))
}

#[derive(Debug, Deserialize)]
struct IterateRequest {
    driver: DriverRecord,
    #[serde(default = "default_max_iterations")]
    max_iterations: u32,
    #[serde(default = "default_tolerance")]
    tolerance: Decimal,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

async fn iterate_handler(Json(body): Json<IterateRequest>) -> Json<IterationOutcome> {
    Json(iterate(&body.driver, body.max_iterations, body.tolerance))
}

#[derive(Debug, Deserialize)]
struct ScenarioRequest {
    driver: DriverRecord,
    field: String,
    values: Vec<Decimal>,
    #[serde(default = "default_max_iterations")]
    max_iterations: u32,
    #[serde(default = "default_tolerance")]
    tolerance: Decimal,
}

async fn scenario_handler(
    Json(body): Json<ScenarioRequest>,
) -> Result<Json<Vec<zeltra_core::statement::scenario::ScenarioRow>>, ApiError> {
    let points = scenario_sweep(&body.driver, &body.field, &body.values, body.max_iterations, body.tolerance)
        .map_err(ApiError::Statement)?;
    let rows = points.iter().map(zeltra_core::statement::scenario::ScenarioRow::from).collect();
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct DiagnoseRequest {
    prior_period: String,
    current_period: String,
    #[serde(default)]
    component_names: BTreeMap<String, String>,
    #[serde(default = "default_tolerance")]
    tolerance: Decimal,
    #[serde(default)]
    cash_prefix: Option<String>,
}

async fn diagnose_handler(
    State(state): State<AppState>,
    Json(body): Json<DiagnoseRequest>,
) -> Result<Json<DiagnosticReport>, ApiError> {
    let accounts = AccountRepository::new(&state.db);
    let balances = BalanceRepository::new(&state.db);
    let report_repo = ReportRepository::new(&accounts, &balances);
    let mapping = StatementMapping::standard();
    let cash_prefix = body.cash_prefix.as_deref().unwrap_or(DEFAULT_CASH_PREFIX);

    let prior = report_repo.render(&body.prior_period, &mapping, cash_prefix).await?;
    let current = report_repo.render(&body.current_period, &mapping, cash_prefix).await?;

    Ok(Json(diagnose(
        &prior.balance_sheet,
        &current.balance_sheet,
        &current.cash_flow_statement,
        &body.component_names,
        body.tolerance,
    )))
}

#[derive(Debug, Deserialize)]
struct ExplainRequest {
    driver: DriverRecord,
    field: String,
}

async fn explain_handler(Json(body): Json<ExplainRequest>) -> Result<Json<ExplainNode>, ApiError> {
    let result = run_once(&body.driver);
    let node = explain(&result, &body.field).map_err(ApiError::Statement)?;
    Ok(Json(node))
}

/// Routes mounted under `/statements`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statements/ledger/{period}", get(render_ledger))
        .route("/statements/model/run-once", post(run_once_handler))
        .route("/statements/model/iterate", post(iterate_handler))
        .route("/statements/model/scenario", post(scenario_handler))
        .route("/statements/model/diagnose", post(diagnose_handler))
        .route("/statements/model/explain", post(explain_handler))
}
