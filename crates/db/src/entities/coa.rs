//! Chart of Accounts & Dimensions (C1): `accounts`, `dimensions`.

pub mod accounts {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub code: String,
        pub name: String,
        pub level: i32,
        pub parent_code: Option<String>,
        pub r#type: String,
        pub direction: String,
        pub cash_flow: String,
        pub enabled: bool,
        pub system: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "Entity",
            from = "Column::ParentCode",
            to = "Column::Code"
        )]
        Parent,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod dimensions {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "dimensions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub r#type: String,
        pub code: String,
        pub name: String,
        pub parent_id: Option<Uuid>,
        #[sea_orm(column_type = "Json", nullable)]
        pub extra: Option<Value>,
        pub enabled: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "Entity",
            from = "Column::ParentId",
            to = "Column::Id"
        )]
        Parent,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
