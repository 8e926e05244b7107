//! Balance Engine (C3): `balances`, the flat index keyed by account,
//! period, and the five dimension values.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_code: String,
    pub period: String,
    pub dept_id: Uuid,
    pub project_id: Uuid,
    pub customer_id: Uuid,
    pub supplier_id: Uuid,
    pub employee_id: Uuid,
    pub opening_balance: Decimal,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub closing_balance: Decimal,
    pub foreign_opening: Option<Decimal>,
    pub foreign_debit: Option<Decimal>,
    pub foreign_credit: Option<Decimal>,
    pub foreign_closing: Option<Decimal>,
    pub currency_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::coa::accounts::Entity",
        from = "Column::AccountCode",
        to = "super::coa::accounts::Column::Code"
    )]
    Account,
}

impl ActiveModelBehavior for ActiveModel {}
