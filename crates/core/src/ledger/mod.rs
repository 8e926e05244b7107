//! Voucher Store and Balance Engine (spec 4.1, 4.2): the draft-to-confirmed
//! state machine, admission rules, voucher numbering, and the flat balance
//! index with period rollover and rebuild-by-replay.

pub mod balance;
pub mod error;
pub mod numbering;
pub mod types;
pub mod voucher;

pub use balance::{rebuild, Balance, BalanceKey};
pub use error::LedgerError;
pub use numbering::format_voucher_no;
pub use types::{
    EntryKind, Voucher, VoucherEntry, VoucherEntryRequest, VoucherRequest, VoucherStatus,
    VoucherTotals, BALANCE_TOLERANCE,
};
pub use voucher::{admit, Admission};
