//! Auxiliary dimensions (department, project, customer, supplier, employee).

use serde::{Deserialize, Serialize};
use zeltra_shared::types::DimensionValueId;

/// The five auxiliary dimension types a voucher entry line can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    /// Cost-center / department.
    Department,
    /// Project.
    Project,
    /// Customer (also the AR sub-ledger's counterparty dimension).
    Customer,
    /// Supplier (also the AP sub-ledger's counterparty dimension).
    Supplier,
    /// Employee.
    Employee,
}

impl DimensionType {
    /// All dimension types, in the fixed order the balance key (spec 3, 6)
    /// lists them: `dept, project, customer, supplier, employee`.
    pub const ALL: [Self; 5] = [
        Self::Department,
        Self::Project,
        Self::Customer,
        Self::Supplier,
        Self::Employee,
    ];
}

/// A value within a dimension's own code+name namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Unique identifier.
    pub id: DimensionValueId,
    /// Which dimension this value belongs to.
    pub dimension_type: DimensionType,
    /// Code within the dimension's namespace.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional parent, for hierarchical dimensions (e.g. department tree).
    pub parent_id: Option<DimensionValueId>,
    /// Whether entries may currently reference this value.
    pub enabled: bool,
}

/// A fully-resolved set of dimension references for one voucher entry line
/// or one balance key. The absent reference is the sentinel
/// [`DimensionValueId::none`], never `None` itself, so the balance index
/// stays keyed uniformly by an 8-tuple (spec 3: "The absent reference is
/// represented by a sentinel value, not null").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionKey {
    /// Department dimension value, or the sentinel.
    pub department: DimensionValueId,
    /// Project dimension value, or the sentinel.
    pub project: DimensionValueId,
    /// Customer dimension value, or the sentinel.
    pub customer: DimensionValueId,
    /// Supplier dimension value, or the sentinel.
    pub supplier: DimensionValueId,
    /// Employee dimension value, or the sentinel.
    pub employee: DimensionValueId,
}

impl DimensionKey {
    /// A key with no dimensions set — every field is the sentinel.
    #[must_use]
    pub fn none() -> Self {
        Self {
            department: DimensionValueId::none(),
            project: DimensionValueId::none(),
            customer: DimensionValueId::none(),
            supplier: DimensionValueId::none(),
            employee: DimensionValueId::none(),
        }
    }
}

impl Default for DimensionKey {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_key_uses_sentinel_not_absence() {
        let key = DimensionKey::none();
        assert_eq!(key.department, DimensionValueId::none());
        assert_eq!(key.department.into_inner(), uuid::Uuid::nil());
    }

    #[test]
    fn dimension_type_order_matches_balance_key() {
        assert_eq!(
            DimensionType::ALL,
            [
                DimensionType::Department,
                DimensionType::Project,
                DimensionType::Customer,
                DimensionType::Supplier,
                DimensionType::Employee,
            ]
        );
    }
}
