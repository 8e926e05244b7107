//! Inventory costing sub-ledger (C5): `inventory_batches`,
//! `inventory_moves`, `inventory_counts`, `inventory_serials`.

pub mod inventory_batches {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "inventory_batches")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub sku: String,
        pub received_at: Date,
        pub quantity: Decimal,
        pub unit_cost: Decimal,
        pub remaining_quantity: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod inventory_moves {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// One receipt or issue against a sku, with the costing outcome
    /// already resolved (spec 4.4: FIFO/moving-average/standard).
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "inventory_moves")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub sku: String,
        pub voucher_id: Option<Uuid>,
        pub direction: String,
        pub quantity: Decimal,
        pub unit_cost: Decimal,
        pub amount: Decimal,
        pub moved_at: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod inventory_counts {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// A physical-count reconciliation: counted quantity against
    /// system quantity, producing the deficit/surplus adjustment
    /// voucher.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "inventory_counts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub sku: String,
        pub counted_at: Date,
        pub system_quantity: Decimal,
        pub counted_quantity: Decimal,
        pub adjustment_voucher_id: Option<Uuid>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod inventory_serials {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Serial/lot traceability for a single unit within a batch.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "inventory_serials")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub batch_id: Uuid,
        pub serial_no: String,
        pub is_consumed: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::inventory_batches::Entity",
            from = "Column::BatchId",
            to = "super::inventory_batches::Column::Id"
        )]
        Batch,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
