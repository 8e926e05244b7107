//! Auxiliary-dimension repository (C1).

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use zeltra_core::coa::{Dimension, DimensionType};
use zeltra_core::ledger::LedgerError;
use zeltra_shared::types::DimensionValueId;

use crate::entities::coa::dimensions;

fn to_domain(model: dimensions::Model) -> Dimension {
    Dimension {
        id: DimensionValueId::from_uuid(model.id),
        dimension_type: parse_type(&model.r#type),
        code: model.code,
        name: model.name,
        parent_id: model.parent_id.map(DimensionValueId::from_uuid),
        enabled: model.enabled,
    }
}

fn parse_type(s: &str) -> DimensionType {
    match s {
        "project" => DimensionType::Project,
        "customer" => DimensionType::Customer,
        "supplier" => DimensionType::Supplier,
        "employee" => DimensionType::Employee,
        _ => DimensionType::Department,
    }
}

fn type_str(t: DimensionType) -> &'static str {
    match t {
        DimensionType::Department => "department",
        DimensionType::Project => "project",
        DimensionType::Customer => "customer",
        DimensionType::Supplier => "supplier",
        DimensionType::Employee => "employee",
    }
}

/// Repository for the `dimensions` table.
pub struct DimensionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DimensionRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves whether `id` is an enabled value of `dimension_type`, the
    /// exact shape [`zeltra_core::ledger::voucher::validate_dimensions`]
    /// needs for its lookup closure. The sentinel id is never looked up
    /// by a caller (it is filtered out before reaching here).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn resolve_enabled(
        &self,
        dimension_type: DimensionType,
        id: Uuid,
    ) -> Result<Option<bool>, LedgerError> {
        let row = dimensions::Entity::find_by_id(id)
            .filter(dimensions::Column::Type.eq(type_str(dimension_type)))
            .one(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(row.map(|r| r.enabled))
    }

    /// Lists every value within one dimension type.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn list_by_type(&self, dimension_type: DimensionType) -> Result<Vec<Dimension>, LedgerError> {
        dimensions::Entity::find()
            .filter(dimensions::Column::Type.eq(type_str(dimension_type)))
            .all(self.db)
            .await
            .map(|rows| rows.into_iter().map(to_domain).collect())
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Inserts a new dimension value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn create(&self, dimension: &Dimension) -> Result<(), LedgerError> {
        let model = dimensions::ActiveModel {
            id: Set(dimension.id.into_inner()),
            r#type: Set(type_str(dimension.dimension_type).to_string()),
            code: Set(dimension.code.clone()),
            name: Set(dimension.name.clone()),
            parent_id: Set(dimension.parent_id.map(DimensionValueId::into_inner)),
            extra: Set(None),
            enabled: Set(dimension.enabled),
        };
        model.insert(self.db).await.map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(id = %dimension.id, dimension_type = type_str(dimension.dimension_type), "dimension value created");
        Ok(())
    }
}
