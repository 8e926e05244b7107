//! Database seeder for Zeltra ledger development and testing.
//!
//! Seeds the functional currency, a standard chart of accounts, sample
//! dimension values, and a handful of exchange rates for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use zeltra_core::coa::{Account, AccountType, CashFlowCategory, Dimension, DimensionType, NormalSide};
use zeltra_core::currency::{ExchangeRate, RateType};
use zeltra_db::entities::currency::currencies;
use zeltra_db::{AccountRepository, CurrencyRepository, DimensionRepository};
use zeltra_shared::types::DimensionValueId;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = zeltra_db::connect(&database_url).await.expect("failed to connect to database");

    println!("Seeding currencies...");
    seed_currencies(&db).await;

    println!("Seeding standard chart of accounts...");
    seed_accounts(&db).await;

    println!("Seeding sample dimension values...");
    seed_dimensions(&db).await;

    println!("Seeding exchange rates...");
    seed_exchange_rates(&db).await;

    println!("Seeding complete!");
}

async fn seed_currencies(db: &DatabaseConnection) {
    let rows = [("USD", "US Dollar", "$", 2), ("EUR", "Euro", "€", 2), ("JPY", "Japanese Yen", "¥", 0)];
    let mut inserted = 0;
    for (code, name, symbol, precision) in rows {
        if currencies::Entity::find_by_id(code.to_string()).one(db).await.ok().flatten().is_some() {
            continue;
        }
        let model = currencies::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            symbol: Set(symbol.to_string()),
            precision: Set(precision),
            is_active: Set(true),
        };
        if let Err(e) = model.insert(db).await {
            eprintln!("failed to insert currency {code}: {e}");
        } else {
            inserted += 1;
        }
    }
    println!("  Inserted {inserted} currencies");
}

/// One line of the standard chart (spec 4.6's boot-time seeding):
/// `(code, name, type, normal_side, cash_flow_category, parent_code)`.
const STANDARD_ACCOUNTS: &[(&str, &str, AccountType, NormalSide, CashFlowCategory, Option<&str>)] = &[
    ("1000", "Assets", AccountType::Asset, NormalSide::Debit, CashFlowCategory::None, None),
    ("1001", "Cash and Cash Equivalents", AccountType::Asset, NormalSide::Debit, CashFlowCategory::Operating, Some("1000")),
    ("1100", "Accounts Receivable", AccountType::Asset, NormalSide::Debit, CashFlowCategory::Operating, Some("1000")),
    ("1200", "Inventory", AccountType::Asset, NormalSide::Debit, CashFlowCategory::Operating, Some("1000")),
    ("1500", "Fixed Assets", AccountType::Asset, NormalSide::Debit, CashFlowCategory::Investing, Some("1000")),
    ("1590", "Accumulated Depreciation", AccountType::Asset, NormalSide::Debit, CashFlowCategory::Investing, Some("1000")),
    ("2000", "Liabilities", AccountType::Liability, NormalSide::Credit, CashFlowCategory::None, None),
    ("2100", "Accounts Payable", AccountType::Liability, NormalSide::Credit, CashFlowCategory::Operating, Some("2000")),
    ("2200", "Loans Payable", AccountType::Liability, NormalSide::Credit, CashFlowCategory::Financing, Some("2000")),
    ("3000", "Equity", AccountType::Equity, NormalSide::Credit, CashFlowCategory::None, None),
    ("3100", "Share Capital", AccountType::Equity, NormalSide::Credit, CashFlowCategory::Financing, Some("3000")),
    ("3200", "Retained Earnings", AccountType::Equity, NormalSide::Credit, CashFlowCategory::None, Some("3000")),
    ("4000", "Revenue", AccountType::Revenue, NormalSide::Credit, CashFlowCategory::None, None),
    ("4100", "Sales Revenue", AccountType::Revenue, NormalSide::Credit, CashFlowCategory::None, Some("4000")),
    ("5000", "Cost of Goods Sold", AccountType::Expense, NormalSide::Debit, CashFlowCategory::None, None),
    ("6000", "Operating Expenses", AccountType::Expense, NormalSide::Debit, CashFlowCategory::None, None),
    ("6100", "Depreciation Expense", AccountType::Expense, NormalSide::Debit, CashFlowCategory::None, Some("6000")),
    ("6200", "Interest Expense", AccountType::Expense, NormalSide::Debit, CashFlowCategory::None, Some("6000")),
    ("6300", "Tax Expense", AccountType::Expense, NormalSide::Debit, CashFlowCategory::None, Some("6000")),
];

async fn seed_accounts(db: &DatabaseConnection) {
    let repo = AccountRepository::new(db);
    let mut inserted = 0;
    for &(code, name, account_type, normal_side, cash_flow_category, parent_code) in STANDARD_ACCOUNTS {
        if repo.find(code).await.ok().flatten().is_some() {
            continue;
        }
        let parent = match parent_code {
            Some(p) => repo.find(p).await.ok().flatten(),
            None => None,
        };
        let level = if parent.is_some() { 1 } else { 0 };
        let account = Account {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            normal_side,
            cash_flow_category,
            parent_code: parent_code.map(ToString::to_string),
            enabled: true,
            system_seeded: true,
            revaluable: false,
        };
        if let Err(e) = repo.create(&account, parent.as_ref(), level).await {
            eprintln!("failed to insert account {code}: {e}");
        } else {
            inserted += 1;
        }
    }
    println!("  Inserted {inserted} accounts");
}

async fn seed_dimensions(db: &DatabaseConnection) {
    let repo = DimensionRepository::new(db);
    let departments = [("DEPT-ENG", "Engineering"), ("DEPT-SALES", "Sales"), ("DEPT-FIN", "Finance")];
    let projects = [("PROJ-ALPHA", "Project Alpha"), ("PROJ-BETA", "Project Beta")];

    let mut inserted = 0;
    for (code, name) in departments {
        let dimension = Dimension {
            id: DimensionValueId::new(),
            dimension_type: DimensionType::Department,
            code: code.to_string(),
            name: name.to_string(),
            parent_id: None,
            enabled: true,
        };
        if let Err(e) = repo.create(&dimension).await {
            eprintln!("failed to insert department {code}: {e}");
        } else {
            inserted += 1;
        }
    }
    for (code, name) in projects {
        let dimension = Dimension {
            id: DimensionValueId::new(),
            dimension_type: DimensionType::Project,
            code: code.to_string(),
            name: name.to_string(),
            parent_id: None,
            enabled: true,
        };
        if let Err(e) = repo.create(&dimension).await {
            eprintln!("failed to insert project {code}: {e}");
        } else {
            inserted += 1;
        }
    }
    println!("  Inserted {inserted} dimension values");
}

async fn seed_exchange_rates(db: &DatabaseConnection) {
    let repo = CurrencyRepository::new(db);
    let today = Utc::now().date_naive();
    let rates = [("EUR", dec!(0.92)), ("JPY", dec!(149.50))];

    let mut inserted = 0;
    for (currency, rate) in rates {
        let exchange_rate = ExchangeRate {
            currency: currency.to_string(),
            date: today,
            rate_type: RateType::Spot,
            rate,
            source: "seeder".to_string(),
        };
        if let Err(e) = repo.record_rate(&exchange_rate).await {
            eprintln!("failed to insert exchange rate for {currency}: {e}");
        } else {
            inserted += 1;
        }
    }
    println!("  Inserted {inserted} exchange rates");
}
