//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod balance;
pub mod currency;
pub mod dimension;
pub mod period;
pub mod report;
pub mod voucher;

pub use account::AccountRepository;
pub use balance::BalanceRepository;
pub use currency::CurrencyRepository;
pub use dimension::DimensionRepository;
pub use period::{ClosingTemplateRepository, PeriodRepository, VoucherTemplateRepository};
pub use report::ReportRepository;
pub use voucher::VoucherRepository;
