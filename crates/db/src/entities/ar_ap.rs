//! AR/AP sub-ledger (C5): `ar_items`, `ap_items`, `ar_settlements`,
//! `ap_settlements`.

pub mod ar_items {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ar_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub customer_id: Uuid,
        pub voucher_id: Uuid,
        pub amount: Decimal,
        pub invoice_date: Date,
        pub outstanding: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ap_items {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ap_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub supplier_id: Uuid,
        pub voucher_id: Uuid,
        pub amount: Decimal,
        pub invoice_date: Date,
        pub outstanding: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ar_settlements {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ar_settlements")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub ar_item_id: Uuid,
        pub voucher_id: Uuid,
        pub amount: Decimal,
        pub settled_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::ar_items::Entity",
            from = "Column::ArItemId",
            to = "super::ar_items::Column::Id"
        )]
        ArItem,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod ap_settlements {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ap_settlements")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub ap_item_id: Uuid,
        pub voucher_id: Uuid,
        pub amount: Decimal,
        pub settled_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::ap_items::Entity",
            from = "Column::ApItemId",
            to = "super::ap_items::Column::Id"
        )]
        ApItem,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
