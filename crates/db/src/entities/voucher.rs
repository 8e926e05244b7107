//! Voucher Store (C2): `vouchers`, `voucher_entries`, `void_vouchers`,
//! `voucher_events`.

pub mod vouchers {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "vouchers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub voucher_no: Option<String>,
        pub date: Date,
        pub period: String,
        pub description: String,
        pub status: String,
        pub entry_type: String,
        pub source_template: Option<String>,
        pub source_event_id: Option<String>,
        pub void_reason: Option<String>,
        pub created_at: DateTimeWithTimeZone,
        pub confirmed_at: Option<DateTimeWithTimeZone>,
        pub voided_at: Option<DateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::voucher_entries::Entity")]
        Entries,
    }

    impl Related<super::voucher_entries::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Entries.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod voucher_entries {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "voucher_entries")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub voucher_id: Uuid,
        pub line_no: i32,
        pub account_code: String,
        pub account_name: String,
        pub description: Option<String>,
        pub debit_amount: Decimal,
        pub credit_amount: Decimal,
        pub currency_code: Option<String>,
        pub fx_rate: Option<Decimal>,
        pub foreign_debit: Option<Decimal>,
        pub foreign_credit: Option<Decimal>,
        // Dimension references use the zero-uuid sentinel (never null)
        // per spec 3/6.
        pub dept_id: Uuid,
        pub project_id: Uuid,
        pub customer_id: Uuid,
        pub supplier_id: Uuid,
        pub employee_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::vouchers::Entity",
            from = "Column::VoucherId",
            to = "super::vouchers::Column::Id"
        )]
        Voucher,
    }

    impl Related<super::vouchers::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Voucher.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod void_vouchers {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "void_vouchers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub original_voucher_id: Uuid,
        pub void_voucher_id: Uuid,
        pub reason: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::vouchers::Entity",
            from = "Column::OriginalVoucherId",
            to = "super::vouchers::Column::Id"
        )]
        Original,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod voucher_events {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Idempotency ledger: one row per admitted `source_event_id`,
    /// resolving the template that synthesized the voucher (spec 4.1, P7).
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "voucher_events")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub event_id: String,
        pub template_code: String,
        pub voucher_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::vouchers::Entity",
            from = "Column::VoucherId",
            to = "super::vouchers::Column::Id"
        )]
        Voucher,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
