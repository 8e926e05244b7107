//! Ledger-mode statement rendering (C6): aggregates the persisted balance
//! index through a [`StatementMapping`] (spec 4.5.1). Model mode, diagnose,
//! scenario, and explain are pure functions over a caller-supplied
//! [`zeltra_core::statement::DriverRecord`] with no database footprint —
//! the API layer calls them directly.

use rust_decimal::Decimal;

use zeltra_core::coa::Account;
use zeltra_core::ledger::LedgerError;
use zeltra_core::statement::{render, StatementMapping, StatementReport};

use super::account::AccountRepository;
use super::balance::BalanceRepository;

/// Repository-side entry point for ledger-mode rendering.
pub struct ReportRepository<'a> {
    accounts: &'a AccountRepository<'a>,
    balances: &'a BalanceRepository<'a>,
}

impl<'a> ReportRepository<'a> {
    /// Builds a repository over already-bound account and balance
    /// repositories.
    #[must_use]
    pub fn new(accounts: &'a AccountRepository<'a>, balances: &'a BalanceRepository<'a>) -> Self {
        Self { accounts, balances }
    }

    /// Renders the three primary statements for `period` under `mapping`,
    /// computing opening/closing cash as the sum of every balance row
    /// whose account code starts with `cash_prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn render(
        &self,
        period: &str,
        mapping: &StatementMapping,
        cash_prefix: &str,
    ) -> Result<StatementReport, LedgerError> {
        let rows = self.balances.list_for_period(period).await?;
        let all_accounts = self.accounts.list_all().await?;

        let opening_cash: Decimal = rows
            .iter()
            .filter(|b| b.key.account_code.starts_with(cash_prefix))
            .map(|b| b.opening_balance)
            .sum();
        let closing_cash: Decimal = rows
            .iter()
            .filter(|b| b.key.account_code.starts_with(cash_prefix))
            .map(|b| b.closing_balance)
            .sum();

        let lookup = move |code: &str| -> Option<Account> {
            all_accounts.iter().find(|a| a.code == code).cloned()
        };

        Ok(render(mapping, period, &rows, lookup, opening_cash, closing_cash))
    }
}
