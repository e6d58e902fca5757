use async_trait::async_trait;
use chrono::NaiveDate;

use super::rates_model::{NewRateSnapshot, RateCacheStatus, RateSnapshot};
use crate::errors::Result;

/// Trait defining the contract for rate snapshot persistence.
pub trait RateRepositoryTrait: Send + Sync {
    fn has_snapshots_for(&self, date: NaiveDate) -> Result<bool>;
    fn latest_date(&self) -> Result<Option<NaiveDate>>;
    /// All snapshots for the most recent cached date, ordered by currency code.
    fn snapshots_for_latest_date(&self) -> Result<Vec<RateSnapshot>>;
    fn snapshots_for_date(&self, date: NaiveDate) -> Result<Vec<RateSnapshot>>;
    fn find(&self, currency: &str, date: NaiveDate) -> Result<Option<RateSnapshot>>;
    fn find_in_range(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RateSnapshot>>;
    /// Persists snapshots, skipping any (currency, date) already stored.
    /// Returns the number of rows actually inserted.
    fn save_snapshots(&self, snapshots: &[NewRateSnapshot]) -> Result<usize>;
    fn count(&self) -> Result<i64>;
    fn latest(&self, limit: i64) -> Result<Vec<RateSnapshot>>;
}

/// Trait defining the contract for the rate resolver.
#[async_trait]
pub trait RateServiceTrait: Send + Sync {
    async fn get_current_rates(&self, force_refresh: bool) -> Result<Vec<RateSnapshot>>;
    async fn get_historical_rate(&self, currency: &str, date: NaiveDate) -> Result<RateSnapshot>;
    async fn get_rates_for_period(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RateSnapshot>>;
    fn cache_status(&self) -> Result<RateCacheStatus>;
}
