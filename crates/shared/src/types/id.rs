//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `VoucherId` where an
//! `ArItemId` is expected. `Account`s and `Period`s are keyed by their own
//! natural string keys (`code`, `YYYY-MM`) and have no typed UUID wrapper.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(VoucherId, "Unique identifier for a voucher.");
typed_id!(
    VoucherEntryId,
    "Unique identifier for a single voucher entry line."
);
typed_id!(DimensionValueId, "Unique identifier for a dimension value.");

impl DimensionValueId {
    /// The sentinel value representing "no dimension reference". The
    /// balance index (spec 3) keys on dimension-absent entries uniformly
    /// by this value rather than by `Option::None`.
    #[must_use]
    pub const fn none() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the sentinel "absent" value.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0.is_nil()
    }
}
typed_id!(ArItemId, "Unique identifier for an accounts-receivable open item.");
typed_id!(ApItemId, "Unique identifier for an accounts-payable open item.");
typed_id!(
    InventoryBatchId,
    "Unique identifier for an inventory costing batch (lot)."
);
typed_id!(FixedAssetId, "Unique identifier for a fixed asset.");
typed_id!(
    CipProjectId,
    "Unique identifier for a construction-in-progress project."
);
