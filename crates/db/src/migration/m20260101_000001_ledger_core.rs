//! Ledger core schema migration.
//!
//! Creates every table named in spec 6 in one migration, grouped by the
//! component that owns it. One `up()` executing a sequence of
//! `execute_unprepared(...)` string constants, same shape the reference
//! workspace's initial migration used for its own (since-dropped) schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // C1: chart of accounts & dimensions
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(DIMENSIONS_SQL).await?;

        // ============================================================
        // C2: voucher store
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_ENTRIES_SQL).await?;
        db.execute_unprepared(VOID_VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_EVENTS_SQL).await?;

        // ============================================================
        // C3: balance engine
        // ============================================================
        db.execute_unprepared(BALANCES_SQL).await?;

        // ============================================================
        // C4: period & closing engine
        // ============================================================
        db.execute_unprepared(PERIODS_SQL).await?;
        db.execute_unprepared(CLOSING_TEMPLATES_SQL).await?;
        db.execute_unprepared(VOUCHER_TEMPLATES_SQL).await?;

        // ============================================================
        // C5: FX layer
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

        // ============================================================
        // C5: AR/AP sub-ledger
        // ============================================================
        db.execute_unprepared(AR_ITEMS_SQL).await?;
        db.execute_unprepared(AP_ITEMS_SQL).await?;
        db.execute_unprepared(AR_SETTLEMENTS_SQL).await?;
        db.execute_unprepared(AP_SETTLEMENTS_SQL).await?;

        // ============================================================
        // C5: inventory costing sub-ledger
        // ============================================================
        db.execute_unprepared(INVENTORY_BATCHES_SQL).await?;
        db.execute_unprepared(INVENTORY_MOVES_SQL).await?;
        db.execute_unprepared(INVENTORY_COUNTS_SQL).await?;
        db.execute_unprepared(INVENTORY_SERIALS_SQL).await?;

        // ============================================================
        // C5: fixed-asset sub-ledger
        // ============================================================
        db.execute_unprepared(FIXED_ASSETS_SQL).await?;
        db.execute_unprepared(FIXED_ASSET_CHANGES_SQL).await?;
        db.execute_unprepared(FIXED_ASSET_IMPAIRMENTS_SQL).await?;
        db.execute_unprepared(CIP_PROJECTS_SQL).await?;
        db.execute_unprepared(CIP_TRANSFERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r#"
CREATE TABLE accounts (
    code            TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    level           INT NOT NULL DEFAULT 0,
    parent_code     TEXT REFERENCES accounts(code),
    type            TEXT NOT NULL,
    direction       TEXT NOT NULL,
    cash_flow       TEXT NOT NULL DEFAULT 'none',
    enabled         BOOLEAN NOT NULL DEFAULT TRUE,
    system          BOOLEAN NOT NULL DEFAULT FALSE
);
CREATE INDEX idx_accounts_parent ON accounts(parent_code);
"#;

const DIMENSIONS_SQL: &str = r#"
CREATE TABLE dimensions (
    id          UUID PRIMARY KEY,
    type        TEXT NOT NULL,
    code        TEXT NOT NULL,
    name        TEXT NOT NULL,
    parent_id   UUID REFERENCES dimensions(id),
    extra       JSONB,
    enabled     BOOLEAN NOT NULL DEFAULT TRUE,
    UNIQUE (type, code)
);
"#;

const VOUCHERS_SQL: &str = r#"
CREATE TABLE vouchers (
    id                  UUID PRIMARY KEY,
    voucher_no          TEXT UNIQUE,
    date                DATE NOT NULL,
    period              TEXT NOT NULL,
    description         TEXT NOT NULL DEFAULT '',
    status              TEXT NOT NULL,
    entry_type          TEXT NOT NULL,
    source_template     TEXT,
    source_event_id     TEXT UNIQUE,
    void_reason         TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT now(),
    confirmed_at        TIMESTAMPTZ,
    voided_at           TIMESTAMPTZ
);
CREATE INDEX idx_vouchers_period ON vouchers(period);
CREATE INDEX idx_vouchers_status ON vouchers(status);
"#;

const VOUCHER_ENTRIES_SQL: &str = r#"
CREATE TABLE voucher_entries (
    id              UUID PRIMARY KEY,
    voucher_id      UUID NOT NULL REFERENCES vouchers(id),
    line_no         INT NOT NULL,
    account_code    TEXT NOT NULL REFERENCES accounts(code),
    account_name    TEXT NOT NULL,
    description     TEXT,
    debit_amount    NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit_amount   NUMERIC(18, 2) NOT NULL DEFAULT 0,
    currency_code   TEXT,
    fx_rate         NUMERIC(18, 6),
    foreign_debit   NUMERIC(18, 2),
    foreign_credit  NUMERIC(18, 2),
    dept_id         UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    project_id      UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    customer_id     UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    supplier_id     UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    employee_id     UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000'
);
CREATE INDEX idx_voucher_entries_voucher ON voucher_entries(voucher_id);
CREATE INDEX idx_voucher_entries_account ON voucher_entries(account_code);
"#;

const VOID_VOUCHERS_SQL: &str = r#"
CREATE TABLE void_vouchers (
    id                  UUID PRIMARY KEY,
    original_voucher_id UUID NOT NULL REFERENCES vouchers(id),
    void_voucher_id     UUID NOT NULL REFERENCES vouchers(id),
    reason              TEXT NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const VOUCHER_EVENTS_SQL: &str = r#"
CREATE TABLE voucher_events (
    event_id        TEXT PRIMARY KEY,
    template_code   TEXT NOT NULL,
    voucher_id      UUID NOT NULL REFERENCES vouchers(id)
);
"#;

const BALANCES_SQL: &str = r#"
CREATE TABLE balances (
    id                  UUID PRIMARY KEY,
    account_code        TEXT NOT NULL REFERENCES accounts(code),
    period              TEXT NOT NULL,
    dept_id             UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    project_id          UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    customer_id         UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    supplier_id         UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    employee_id         UUID NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
    opening_balance     NUMERIC(18, 2) NOT NULL DEFAULT 0,
    debit_amount        NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit_amount       NUMERIC(18, 2) NOT NULL DEFAULT 0,
    closing_balance     NUMERIC(18, 2) NOT NULL DEFAULT 0,
    foreign_opening     NUMERIC(18, 2),
    foreign_debit       NUMERIC(18, 2),
    foreign_credit      NUMERIC(18, 2),
    foreign_closing     NUMERIC(18, 2),
    currency_code       TEXT,
    UNIQUE (account_code, period, dept_id, project_id, customer_id, supplier_id, employee_id)
);
"#;

const PERIODS_SQL: &str = r#"
CREATE TABLE periods (
    period      TEXT PRIMARY KEY,
    status      TEXT NOT NULL DEFAULT 'open',
    opened_at   TIMESTAMPTZ,
    closed_at   TIMESTAMPTZ
);
"#;

const CLOSING_TEMPLATES_SQL: &str = r#"
CREATE TABLE closing_templates (
    code        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    rule_json   JSONB NOT NULL,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const VOUCHER_TEMPLATES_SQL: &str = r#"
CREATE TABLE voucher_templates (
    code        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    rule_json   JSONB NOT NULL,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const CURRENCIES_SQL: &str = r#"
CREATE TABLE currencies (
    code        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    symbol      TEXT NOT NULL,
    precision   INT NOT NULL DEFAULT 2,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE
);
"#;

const EXCHANGE_RATES_SQL: &str = r#"
CREATE TABLE exchange_rates (
    currency    TEXT NOT NULL REFERENCES currencies(code),
    date        DATE NOT NULL,
    rate_type   TEXT NOT NULL,
    rate        NUMERIC(18, 6) NOT NULL,
    source      TEXT NOT NULL DEFAULT 'manual',
    PRIMARY KEY (currency, date, rate_type)
);
"#;

const AR_ITEMS_SQL: &str = r#"
CREATE TABLE ar_items (
    id              UUID PRIMARY KEY,
    customer_id     UUID NOT NULL REFERENCES dimensions(id),
    voucher_id      UUID NOT NULL REFERENCES vouchers(id),
    amount          NUMERIC(18, 2) NOT NULL,
    invoice_date    DATE NOT NULL,
    outstanding     NUMERIC(18, 2) NOT NULL
);
CREATE INDEX idx_ar_items_customer ON ar_items(customer_id);
"#;

const AP_ITEMS_SQL: &str = r#"
CREATE TABLE ap_items (
    id              UUID PRIMARY KEY,
    supplier_id     UUID NOT NULL REFERENCES dimensions(id),
    voucher_id      UUID NOT NULL REFERENCES vouchers(id),
    amount          NUMERIC(18, 2) NOT NULL,
    invoice_date    DATE NOT NULL,
    outstanding     NUMERIC(18, 2) NOT NULL
);
CREATE INDEX idx_ap_items_supplier ON ap_items(supplier_id);
"#;

const AR_SETTLEMENTS_SQL: &str = r#"
CREATE TABLE ar_settlements (
    id              UUID PRIMARY KEY,
    ar_item_id      UUID NOT NULL REFERENCES ar_items(id),
    voucher_id      UUID NOT NULL REFERENCES vouchers(id),
    amount          NUMERIC(18, 2) NOT NULL,
    settled_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const AP_SETTLEMENTS_SQL: &str = r#"
CREATE TABLE ap_settlements (
    id              UUID PRIMARY KEY,
    ap_item_id      UUID NOT NULL REFERENCES ap_items(id),
    voucher_id      UUID NOT NULL REFERENCES vouchers(id),
    amount          NUMERIC(18, 2) NOT NULL,
    settled_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const INVENTORY_BATCHES_SQL: &str = r#"
CREATE TABLE inventory_batches (
    id                  UUID PRIMARY KEY,
    sku                 TEXT NOT NULL,
    received_at         DATE NOT NULL,
    quantity            NUMERIC(18, 4) NOT NULL,
    unit_cost           NUMERIC(18, 2) NOT NULL,
    remaining_quantity  NUMERIC(18, 4) NOT NULL
);
CREATE INDEX idx_inventory_batches_sku ON inventory_batches(sku, received_at);
"#;

const INVENTORY_MOVES_SQL: &str = r#"
CREATE TABLE inventory_moves (
    id          UUID PRIMARY KEY,
    sku         TEXT NOT NULL,
    voucher_id  UUID REFERENCES vouchers(id),
    direction   TEXT NOT NULL,
    quantity    NUMERIC(18, 4) NOT NULL,
    unit_cost   NUMERIC(18, 2) NOT NULL,
    amount      NUMERIC(18, 2) NOT NULL,
    moved_at    DATE NOT NULL
);
CREATE INDEX idx_inventory_moves_sku ON inventory_moves(sku, moved_at);
"#;

const INVENTORY_COUNTS_SQL: &str = r#"
CREATE TABLE inventory_counts (
    id                      UUID PRIMARY KEY,
    sku                     TEXT NOT NULL,
    counted_at              DATE NOT NULL,
    system_quantity         NUMERIC(18, 4) NOT NULL,
    counted_quantity        NUMERIC(18, 4) NOT NULL,
    adjustment_voucher_id   UUID REFERENCES vouchers(id)
);
"#;

const INVENTORY_SERIALS_SQL: &str = r#"
CREATE TABLE inventory_serials (
    id          UUID PRIMARY KEY,
    batch_id    UUID NOT NULL REFERENCES inventory_batches(id),
    serial_no   TEXT NOT NULL,
    is_consumed BOOLEAN NOT NULL DEFAULT FALSE,
    UNIQUE (batch_id, serial_no)
);
"#;

const FIXED_ASSETS_SQL: &str = r#"
CREATE TABLE fixed_assets (
    id                          UUID PRIMARY KEY,
    asset_account                TEXT NOT NULL REFERENCES accounts(code),
    accum_depreciation_account   TEXT NOT NULL REFERENCES accounts(code),
    original_cost                NUMERIC(18, 2) NOT NULL,
    accumulated_depreciation     NUMERIC(18, 2) NOT NULL DEFAULT 0,
    accumulated_impairment       NUMERIC(18, 2) NOT NULL DEFAULT 0,
    useful_life_years            INT NOT NULL,
    years_elapsed                INT NOT NULL DEFAULT 0,
    salvage_value                NUMERIC(18, 2) NOT NULL DEFAULT 0,
    method                       TEXT NOT NULL,
    in_service_date              DATE NOT NULL
);
"#;

const FIXED_ASSET_CHANGES_SQL: &str = r#"
CREATE TABLE fixed_asset_changes (
    id              UUID PRIMARY KEY,
    fixed_asset_id  UUID NOT NULL REFERENCES fixed_assets(id),
    voucher_id      UUID REFERENCES vouchers(id),
    change_type     TEXT NOT NULL,
    amount          NUMERIC(18, 2) NOT NULL,
    effective_date  DATE NOT NULL
);
"#;

const FIXED_ASSET_IMPAIRMENTS_SQL: &str = r#"
CREATE TABLE fixed_asset_impairments (
    id                  UUID PRIMARY KEY,
    fixed_asset_id      UUID NOT NULL REFERENCES fixed_assets(id),
    voucher_id          UUID REFERENCES vouchers(id),
    recoverable_amount  NUMERIC(18, 2) NOT NULL,
    loss                NUMERIC(18, 2) NOT NULL,
    is_reversal         BOOLEAN NOT NULL DEFAULT FALSE,
    recorded_at         DATE NOT NULL
);
"#;

const CIP_PROJECTS_SQL: &str = r#"
CREATE TABLE cip_projects (
    id                  UUID PRIMARY KEY,
    cip_account         TEXT NOT NULL REFERENCES accounts(code),
    accumulated_cost    NUMERIC(18, 2) NOT NULL DEFAULT 0,
    is_transferred      BOOLEAN NOT NULL DEFAULT FALSE
);
"#;

const CIP_TRANSFERS_SQL: &str = r#"
CREATE TABLE cip_transfers (
    id              UUID PRIMARY KEY,
    cip_project_id  UUID NOT NULL REFERENCES cip_projects(id),
    fixed_asset_id  UUID NOT NULL REFERENCES fixed_assets(id),
    voucher_id      UUID REFERENCES vouchers(id),
    amount          NUMERIC(18, 2) NOT NULL,
    transferred_at  DATE NOT NULL
);
"#;

const DROP_ALL_SQL: &str = r#"
DROP TABLE IF EXISTS cip_transfers, cip_projects, fixed_asset_impairments,
    fixed_asset_changes, fixed_assets, inventory_serials, inventory_counts,
    inventory_moves, inventory_batches, ap_settlements, ar_settlements,
    ap_items, ar_items, exchange_rates, currencies, voucher_templates,
    closing_templates, periods, balances, voucher_events, void_vouchers,
    voucher_entries, vouchers, dimensions, accounts CASCADE;
"#;
