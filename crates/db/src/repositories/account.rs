//! Chart-of-accounts repository (C1).

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use zeltra_core::coa::{Account, AccountType, CashFlowCategory, NormalSide};
use zeltra_core::ledger::LedgerError;

use crate::entities::coa::accounts;

fn to_domain(model: accounts::Model) -> Account {
    Account {
        code: model.code,
        name: model.name,
        account_type: parse_account_type(&model.r#type),
        normal_side: parse_normal_side(&model.direction),
        cash_flow_category: parse_cash_flow(&model.cash_flow),
        parent_code: model.parent_code,
        enabled: model.enabled,
        system_seeded: model.system,
        revaluable: false,
    }
}

fn parse_account_type(s: &str) -> AccountType {
    match s {
        "liability" => AccountType::Liability,
        "equity" => AccountType::Equity,
        "revenue" => AccountType::Revenue,
        "expense" => AccountType::Expense,
        _ => AccountType::Asset,
    }
}

fn parse_normal_side(s: &str) -> NormalSide {
    if s == "credit" {
        NormalSide::Credit
    } else {
        NormalSide::Debit
    }
}

fn parse_cash_flow(s: &str) -> CashFlowCategory {
    match s {
        "operating" => CashFlowCategory::Operating,
        "investing" => CashFlowCategory::Investing,
        "financing" => CashFlowCategory::Financing,
        _ => CashFlowCategory::None,
    }
}

fn type_str(t: AccountType) -> &'static str {
    match t {
        AccountType::Asset => "asset",
        AccountType::Liability => "liability",
        AccountType::Equity => "equity",
        AccountType::Revenue => "revenue",
        AccountType::Expense => "expense",
    }
}

fn side_str(s: NormalSide) -> &'static str {
    match s {
        NormalSide::Debit => "debit",
        NormalSide::Credit => "credit",
    }
}

fn cash_flow_str(c: CashFlowCategory) -> &'static str {
    match c {
        CashFlowCategory::Operating => "operating",
        CashFlowCategory::Investing => "investing",
        CashFlowCategory::Financing => "financing",
        CashFlowCategory::None => "none",
    }
}

/// Repository for the `accounts` table.
pub struct AccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AccountRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads one account by code.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, code: &str) -> Result<Option<Account>, LedgerError> {
        accounts::Entity::find_by_id(code.to_string())
            .one(self.db)
            .await
            .map(|opt| opt.map(to_domain))
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Loads every account, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn list_all(&self) -> Result<Vec<Account>, LedgerError> {
        accounts::Entity::find()
            .all(self.db)
            .await
            .map(|rows| rows.into_iter().map(to_domain).collect())
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Loads every account sharing `parent_code`, used to compute a new
    /// account's hierarchy `level`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn children_of(&self, parent_code: &str) -> Result<Vec<Account>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::ParentCode.eq(parent_code))
            .all(self.db)
            .await
            .map(|rows| rows.into_iter().map(to_domain).collect())
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Inserts a new account after validating it against its (already
    /// loaded) parent with [`Account::validate_against_parent`].
    ///
    /// # Errors
    ///
    /// Returns the validation error, mapped to [`LedgerError`], or
    /// [`LedgerError::Database`] on a persistence failure.
    #[tracing::instrument(skip(self, account))]
    pub async fn create(&self, account: &Account, parent: Option<&Account>, level: i32) -> Result<(), LedgerError> {
        account
            .validate_against_parent(parent)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let model = accounts::ActiveModel {
            code: Set(account.code.clone()),
            name: Set(account.name.clone()),
            level: Set(level),
            parent_code: Set(account.parent_code.clone()),
            r#type: Set(type_str(account.account_type).to_string()),
            direction: Set(side_str(account.normal_side).to_string()),
            cash_flow: Set(cash_flow_str(account.cash_flow_category).to_string()),
            enabled: Set(account.enabled),
            system: Set(account.system_seeded),
        };
        model.insert(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(code = %account.code, "account created");
        Ok(())
    }

    /// Disables an account (enable = false never deletes a row; a
    /// system-seeded or posted-to account can never be removed outright,
    /// per [`Account::validate_can_delete`]).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if `code` does not exist,
    /// or [`LedgerError::Database`] on a persistence failure.
    pub async fn set_enabled(&self, code: &str, enabled: bool) -> Result<(), LedgerError> {
        let existing = accounts::Entity::find_by_id(code.to_string())
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        let mut model: accounts::ActiveModel = existing.into();
        model.enabled = Set(enabled);
        model.update(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(code, enabled, "account enabled flag changed");
        Ok(())
    }
}
