//! Multi-currency handling and exchange rates.

pub mod conversion;
pub mod exchange;
pub mod revaluation;

pub use conversion::convert_amount;
pub use exchange::{lookup_rate, ExchangeRate, RateType};
pub use revaluation::{build_revaluation_voucher, compute_delta, RevaluationInput, RevaluationResult};
