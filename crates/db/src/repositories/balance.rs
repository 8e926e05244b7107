//! Balance index repository (C3): the flat table keyed by account, period,
//! and the five dimension values, plus period rollover and full rebuild.

use chrono::Datelike;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use zeltra_core::coa::{Account, DimensionKey};
use zeltra_core::ledger::{Balance, BalanceKey, LedgerError, VoucherEntry};
use zeltra_shared::types::DimensionValueId;

use crate::entities::balance::{ActiveModel, Column, Entity, Model};

fn dims_from_row(row: &Model) -> DimensionKey {
    DimensionKey {
        department: DimensionValueId::from_uuid(row.dept_id),
        project: DimensionValueId::from_uuid(row.project_id),
        customer: DimensionValueId::from_uuid(row.customer_id),
        supplier: DimensionValueId::from_uuid(row.supplier_id),
        employee: DimensionValueId::from_uuid(row.employee_id),
    }
}

fn to_domain(row: Model) -> Balance {
    Balance {
        key: BalanceKey::new(row.account_code.clone(), row.period.clone(), dims_from_row(&row)),
        opening_balance: row.opening_balance,
        debit_total: row.debit_amount,
        credit_total: row.credit_amount,
        closing_balance: row.closing_balance,
        foreign_opening_balance: row.foreign_opening,
        foreign_debit_total: row.foreign_debit,
        foreign_credit_total: row.foreign_credit,
        foreign_closing_balance: row.foreign_closing,
    }
}

/// The `YYYY-MM` period immediately preceding `period`.
fn prev_period(period: &str) -> String {
    let year: i32 = period[0..4].parse().unwrap_or(1970);
    let month: u32 = period[5..7].parse().unwrap_or(1);
    let date = chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let prev = date.checked_sub_months(chrono::Months::new(1)).unwrap_or(date);
    format!("{:04}-{:02}", prev.year(), prev.month())
}

/// Repository for the `balances` table.
pub struct BalanceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BalanceRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads one balance row by its full 7-column key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn get(&self, key: &BalanceKey) -> Result<Option<Balance>, LedgerError> {
        find_row(self.db, key).await.map(|opt| opt.map(to_domain))
    }

    /// Loads every balance row for a period.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn list_for_period(&self, period: &str) -> Result<Vec<Balance>, LedgerError> {
        Entity::find()
            .filter(Column::Period.eq(period))
            .all(self.db)
            .await
            .map(|rows| rows.into_iter().map(to_domain).collect())
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Applies one confirmed voucher entry (or void-reversal entry, already
    /// debit/credit-swapped by the caller) to the balance index, creating
    /// the row on first use with its opening balance seeded from the
    /// immediately preceding period's closing balance (spec 4.2: `opening(P+1)
    /// = closing(P)`).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn apply_entry<C: ConnectionTrait>(
        &self,
        conn: &C,
        account: &Account,
        period: &str,
        entry: &VoucherEntry,
    ) -> Result<(), LedgerError> {
        let key = BalanceKey::new(entry.account_code.clone(), period.to_string(), entry.dimensions);
        let existing = find_row(conn, &key).await?;

        let mut domain = match existing {
            Some(row) => to_domain(row),
            None => {
                let opening = find_row(conn, &BalanceKey::new(key.account_code.clone(), prev_period(period), entry.dimensions))
                    .await?
                    .map_or(Decimal::ZERO, |r| r.closing_balance);
                let foreign_opening = find_row(conn, &BalanceKey::new(key.account_code.clone(), prev_period(period), entry.dimensions))
                    .await?
                    .and_then(|r| r.foreign_closing);
                Balance::opening(key.clone(), opening, foreign_opening.or(entry.currency.map(|_| Decimal::ZERO)))
            }
        };
        domain.apply_entry(account, entry);
        upsert(conn, &domain).await
    }

    /// Replaces every row of `period` with the freshly-computed `rows`
    /// (spec 4.2, P2's rebuild-by-replay). Runs as delete-then-insert
    /// rather than per-row upsert since a rebuild may also need to drop
    /// rows whose key no longer has any entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn replace_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period: &str,
        rows: &[Balance],
    ) -> Result<(), LedgerError> {
        Entity::delete_many()
            .filter(Column::Period.eq(period))
            .exec(conn)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        for row in rows {
            upsert(conn, row).await?;
        }
        Ok(())
    }

    /// Rolls every row of `closed_period` forward into `next_period`'s
    /// opening balances (spec 4.2), upserting rather than requiring
    /// `next_period` to be empty, so a reopen-then-close cycle stays
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn roll_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        closed_period: &str,
        next_period: &str,
    ) -> Result<(), LedgerError> {
        let rows = Entity::find()
            .filter(Column::Period.eq(closed_period))
            .all(conn)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        for row in rows {
            let domain = to_domain(row);
            let rolled = domain.roll_forward(next_period.to_string());
            upsert(conn, &rolled).await?;
        }
        Ok(())
    }
}

async fn find_row<C: ConnectionTrait>(conn: &C, key: &BalanceKey) -> Result<Option<Model>, LedgerError> {
    Entity::find()
        .filter(Column::AccountCode.eq(key.account_code.clone()))
        .filter(Column::Period.eq(key.period.clone()))
        .filter(Column::DeptId.eq(key.dimensions.department.into_inner()))
        .filter(Column::ProjectId.eq(key.dimensions.project.into_inner()))
        .filter(Column::CustomerId.eq(key.dimensions.customer.into_inner()))
        .filter(Column::SupplierId.eq(key.dimensions.supplier.into_inner()))
        .filter(Column::EmployeeId.eq(key.dimensions.employee.into_inner()))
        .one(conn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))
}

async fn upsert<C: ConnectionTrait>(conn: &C, balance: &Balance) -> Result<(), LedgerError> {
    let existing = find_row(conn, &balance.key).await?;
    let id = existing.as_ref().map_or_else(Uuid::now_v7, |r| r.id);
    let model = ActiveModel {
        id: Set(id),
        account_code: Set(balance.key.account_code.clone()),
        period: Set(balance.key.period.clone()),
        dept_id: Set(balance.key.dimensions.department.into_inner()),
        project_id: Set(balance.key.dimensions.project.into_inner()),
        customer_id: Set(balance.key.dimensions.customer.into_inner()),
        supplier_id: Set(balance.key.dimensions.supplier.into_inner()),
        employee_id: Set(balance.key.dimensions.employee.into_inner()),
        opening_balance: Set(balance.opening_balance),
        debit_amount: Set(balance.debit_total),
        credit_amount: Set(balance.credit_total),
        closing_balance: Set(balance.closing_balance),
        foreign_opening: Set(balance.foreign_opening_balance),
        foreign_debit: Set(balance.foreign_debit_total),
        foreign_credit: Set(balance.foreign_credit_total),
        foreign_closing: Set(balance.foreign_closing_balance),
        currency_code: Set(None),
    };
    if existing.is_some() {
        model.update(conn).await.map_err(|e| LedgerError::Database(e.to_string()))?;
    } else {
        model.insert(conn).await.map_err(|e| LedgerError::Database(e.to_string()))?;
    }
    Ok(())
}
