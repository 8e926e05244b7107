//! Sub-ledger & FX Layer (C5, spec 4.4).
//!
//! Each sub-ledger here is the authority for its own quantity/cost
//! lineage (AR/AP open items, inventory batches, fixed-asset cards) but
//! never writes a balance row directly — every operation synthesizes a
//! [`crate::ledger::VoucherRequest`] for the caller to submit through C2,
//! exactly as spec 4.4 requires ("Every sub-ledger write emits a balanced
//! voucher in C2"). FX revaluation lives in [`crate::currency::revaluation`]
//! since it operates on the balance index directly rather than its own
//! sub-ledger table.

pub mod ar_ap;
pub mod fixed_assets;
pub mod inventory;

pub use ar_ap::{AgingBucket, AgingReport, ApItem, ArItem, ProvisionRates};
pub use fixed_assets::{CipProject, DepreciationMethod, FixedAsset};
pub use inventory::{CostingMethod, InventoryBatch, InventoryItem, NegativeInventoryPolicy};
