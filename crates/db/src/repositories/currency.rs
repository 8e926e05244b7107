//! Currency and exchange-rate repository (C5's FX layer).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use zeltra_core::currency::{lookup_rate, ExchangeRate, RateType};
use zeltra_core::ledger::LedgerError;

use crate::entities::currency::{currencies, exchange_rates};

fn rate_type_str(t: RateType) -> &'static str {
    match t {
        RateType::Spot => "spot",
        RateType::Closing => "closing",
        RateType::Average => "average",
    }
}

fn parse_rate_type(s: &str) -> RateType {
    match s {
        "closing" => RateType::Closing,
        "average" => RateType::Average,
        _ => RateType::Spot,
    }
}

fn to_domain(model: exchange_rates::Model) -> ExchangeRate {
    ExchangeRate {
        currency: model.currency,
        date: model.date,
        rate_type: parse_rate_type(&model.rate_type),
        rate: model.rate,
        source: model.source,
    }
}

/// Repository for `currencies` and `exchange_rates`.
pub struct CurrencyRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CurrencyRepository<'a> {
    /// Builds a repository bound to `db`.
    #[must_use]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether `code` is a currently-active currency.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    pub async fn is_active(&self, code: &str) -> Result<bool, LedgerError> {
        currencies::Entity::find_by_id(code.to_string())
            .one(self.db)
            .await
            .map(|row| row.is_some_and(|r| r.is_active))
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Registers a rate, overwriting any existing row at the same
    /// `(currency, date, rate_type)` key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on a persistence failure.
    #[tracing::instrument(skip(self))]
    pub async fn record_rate(&self, rate: &ExchangeRate) -> Result<(), LedgerError> {
        use sea_orm::sea_query::OnConflict;

        let model = exchange_rates::ActiveModel {
            currency: Set(rate.currency.clone()),
            date: Set(rate.date),
            rate_type: Set(rate_type_str(rate.rate_type).to_string()),
            rate: Set(rate.rate),
            source: Set(rate.source.clone()),
        };
        exchange_rates::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    exchange_rates::Column::Currency,
                    exchange_rates::Column::Date,
                    exchange_rates::Column::RateType,
                ])
                .update_columns([exchange_rates::Column::Rate, exchange_rates::Column::Source])
                .to_owned(),
            )
            .exec(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        tracing::info!(currency = %rate.currency, rate = %rate.rate, "exchange rate recorded");
        Ok(())
    }

    /// Finds the rate effective for `currency`/`rate_type` as of `as_of`
    /// (nearest prior date), loading every recorded rate for the pair and
    /// delegating the selection to the pure
    /// [`zeltra_core::currency::lookup_rate`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RateNotFound`] if no eligible rate exists,
    /// or [`LedgerError::Database`] on a persistence failure.
    pub async fn find_rate(
        &self,
        currency: &str,
        rate_type: RateType,
        as_of: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        let rows = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::Currency.eq(currency))
            .filter(exchange_rates::Column::RateType.eq(rate_type_str(rate_type)))
            .all(self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let rates: Vec<ExchangeRate> = rows.into_iter().map(to_domain).collect();
        lookup_rate(&rates, currency, rate_type, as_of)
            .map(|r| r.rate)
            .ok_or_else(|| LedgerError::RateNotFound {
                currency: currency.to_string(),
                date: as_of,
                rate_type: rate_type_str(rate_type).to_string(),
            })
    }
}
