//! Fixed-asset sub-ledger (C5): `fixed_assets`, `fixed_asset_changes`,
//! `fixed_asset_impairments`, `cip_projects`, `cip_transfers`.

pub mod fixed_assets {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "fixed_assets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub asset_account: String,
        pub accum_depreciation_account: String,
        pub original_cost: Decimal,
        pub accumulated_depreciation: Decimal,
        pub accumulated_impairment: Decimal,
        pub useful_life_years: i32,
        pub years_elapsed: i32,
        pub salvage_value: Decimal,
        pub method: String,
        pub in_service_date: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod fixed_asset_changes {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// One periodic depreciation (or disposal) posting against an asset.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "fixed_asset_changes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub fixed_asset_id: Uuid,
        pub voucher_id: Option<Uuid>,
        pub change_type: String,
        pub amount: Decimal,
        pub effective_date: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::fixed_assets::Entity",
            from = "Column::FixedAssetId",
            to = "super::fixed_assets::Column::Id"
        )]
        FixedAsset,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod fixed_asset_impairments {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "fixed_asset_impairments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub fixed_asset_id: Uuid,
        pub voucher_id: Option<Uuid>,
        pub recoverable_amount: Decimal,
        pub loss: Decimal,
        pub is_reversal: bool,
        pub recorded_at: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::fixed_assets::Entity",
            from = "Column::FixedAssetId",
            to = "super::fixed_assets::Column::Id"
        )]
        FixedAsset,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod cip_projects {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cip_projects")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub cip_account: String,
        pub accumulated_cost: Decimal,
        pub is_transferred: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod cip_transfers {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Transfer of an accumulated CIP project balance into an
    /// in-service fixed asset.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cip_transfers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub cip_project_id: Uuid,
        pub fixed_asset_id: Uuid,
        pub voucher_id: Option<Uuid>,
        pub amount: Decimal,
        pub transferred_at: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::cip_projects::Entity",
            from = "Column::CipProjectId",
            to = "super::cip_projects::Column::Id"
        )]
        CipProject,
        #[sea_orm(
            belongs_to = "super::fixed_assets::Entity",
            from = "Column::FixedAssetId",
            to = "super::fixed_assets::Column::Id"
        )]
        FixedAsset,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
