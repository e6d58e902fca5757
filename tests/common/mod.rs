use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use kantor_core::db::{self, DbPool};
use kantor_core::rates::{FixingProvider, RateError};
use kantor_core::rates::rates_provider::{FixingPoint, FixingRate, FixingTable};

pub fn memory_pool() -> Arc<DbPool> {
    // One connection keeps the in-memory database alive across calls
    let pool = db::create_pool_with_size(":memory:", 1).expect("pool");
    db::run_migrations(&pool).expect("migrations");
    pool
}

/// Provider double that publishes the same fixing rates for every business
/// day it is asked about.
pub struct EveryDayProvider {
    rates: Vec<(String, Decimal)>,
}

impl EveryDayProvider {
    pub fn new(rates: &[(&str, Decimal)]) -> Self {
        Self {
            rates: rates
                .iter()
                .map(|(code, mid)| (code.to_string(), *mid))
                .collect(),
        }
    }

    fn point(&self, currency: &str, date: NaiveDate) -> Option<FixingPoint> {
        self.rates
            .iter()
            .find(|(code, _)| code == currency)
            .map(|(_, mid)| FixingPoint {
                date,
                mid: *mid,
                bid: None,
                ask: None,
            })
    }
}

#[async_trait]
impl FixingProvider for EveryDayProvider {
    async fn fetch_table(&self, date: NaiveDate) -> Result<FixingTable, RateError> {
        Ok(FixingTable {
            date,
            rates: self
                .rates
                .iter()
                .map(|(code, mid)| FixingRate {
                    code: code.clone(),
                    mid: *mid,
                    bid: None,
                    ask: None,
                })
                .collect(),
        })
    }

    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<FixingPoint, RateError> {
        self.point(currency, date).ok_or_else(|| {
            RateError::RateNotFound(format!("no fixing for {} on {}", currency, date))
        })
    }

    async fn fetch_series(
        &self,
        currency: &str,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<FixingPoint>, RateError> {
        match self.point(currency, start) {
            Some(point) => Ok(vec![point]),
            None => Err(RateError::RateNotFound(format!(
                "no fixings for {}",
                currency
            ))),
        }
    }
}
