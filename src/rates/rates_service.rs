use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::rates_errors::RateError;
use super::rates_model::{NewRateSnapshot, RateCacheStatus, RateSnapshot};
use super::rates_provider::{FixingPoint, FixingProvider, FixingTable};
use super::rates_traits::{RateRepositoryTrait, RateServiceTrait};
use crate::constants::{CACHE_STATUS_PREVIEW_ROWS, RATE_LOOKBACK_DAYS};
use crate::errors::Result;

/// Resolves daily fixings from the local cache, falling back to the upstream
/// provider and finally to the most recent cached table.
pub struct RateService {
    repository: Arc<dyn RateRepositoryTrait>,
    provider: Arc<dyn FixingProvider>,
    // Serializes live fetches so a scheduled refresh and a manual one don't
    // hit the provider for the same date at once. Persistence is idempotent,
    // overlap would only waste upstream calls.
    refresh_lock: Mutex<()>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl RateService {
    pub fn new(repository: Arc<dyn RateRepositoryTrait>, provider: Arc<dyn FixingProvider>) -> Self {
        Self {
            repository,
            provider,
            refresh_lock: Mutex::new(()),
        }
    }

    fn table_to_snapshots(table: &FixingTable) -> Vec<NewRateSnapshot> {
        table
            .rates
            .iter()
            .map(|rate| NewRateSnapshot {
                currency: rate.code.clone(),
                date: table.date,
                mid: rate.mid,
                bid: rate.bid.unwrap_or(rate.mid),
                ask: rate.ask.unwrap_or(rate.mid),
            })
            .collect()
    }

    fn point_to_snapshot(currency: &str, point: &FixingPoint) -> NewRateSnapshot {
        NewRateSnapshot {
            currency: currency.to_string(),
            date: point.date,
            mid: point.mid,
            bid: point.bid.unwrap_or(point.mid),
            ask: point.ask.unwrap_or(point.mid),
        }
    }

    async fn get_current_rates_from(
        &self,
        force_refresh: bool,
        today: NaiveDate,
    ) -> Result<Vec<RateSnapshot>> {
        if !force_refresh && self.repository.has_snapshots_for(today)? {
            debug!("Serving today's fixing table from cache");
            return self.repository.snapshots_for_latest_date();
        }

        let _guard = self.refresh_lock.lock().await;

        // A refresh that held the lock may have stored today's table already
        if !force_refresh && self.repository.has_snapshots_for(today)? {
            return self.repository.snapshots_for_latest_date();
        }

        // Walk backward over non-weekend days until the provider has a table
        for offset in 0..RATE_LOOKBACK_DAYS {
            let candidate = today - Duration::days(offset);
            if is_weekend(candidate) {
                continue;
            }

            match self.provider.fetch_table(candidate).await {
                Ok(table) => {
                    let snapshots = Self::table_to_snapshots(&table);
                    let inserted = self.repository.save_snapshots(&snapshots)?;
                    info!(
                        "Fetched fixing table for {} ({} rates, {} new)",
                        table.date,
                        snapshots.len(),
                        inserted
                    );
                    return self.repository.snapshots_for_date(table.date);
                }
                Err(e) => {
                    debug!("No fixing table for {}: {}", candidate, e);
                }
            }
        }

        // Upstream exhausted, degrade to the newest cached table
        let cached = self.repository.snapshots_for_latest_date()?;
        if cached.is_empty() {
            return Err(RateError::UpstreamUnavailable(
                "no fixing table published within the lookback window and the rate cache is empty"
                    .to_string(),
            )
            .into());
        }

        warn!(
            "Upstream unavailable, serving cached fixing table from {}",
            cached[0].date
        );
        Ok(cached)
    }
}

#[async_trait]
impl RateServiceTrait for RateService {
    async fn get_current_rates(&self, force_refresh: bool) -> Result<Vec<RateSnapshot>> {
        self.get_current_rates_from(force_refresh, Utc::now().date_naive())
            .await
    }

    async fn get_historical_rate(&self, currency: &str, date: NaiveDate) -> Result<RateSnapshot> {
        if let Some(snapshot) = self.repository.find(currency, date)? {
            debug!("Serving {} fixing for {} from cache", currency, date);
            return Ok(snapshot);
        }

        let point = self.provider.fetch_rate(currency, date).await?;
        let snapshot = Self::point_to_snapshot(currency, &point);
        self.repository.save_snapshots(std::slice::from_ref(&snapshot))?;

        self.repository.find(currency, point.date)?.ok_or_else(|| {
            RateError::Database(format!(
                "snapshot for {} on {} missing after save",
                currency, point.date
            ))
            .into()
        })
    }

    async fn get_rates_for_period(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RateSnapshot>> {
        // Cache hit is all-or-nothing: any cached rows in range win outright
        let cached = self.repository.find_in_range(currency, start, end)?;
        if !cached.is_empty() {
            debug!(
                "Serving {} fixings for {} {}..{} from cache",
                cached.len(),
                currency,
                start,
                end
            );
            return Ok(cached);
        }

        let points = self.provider.fetch_series(currency, start, end).await?;
        let snapshots: Vec<NewRateSnapshot> = points
            .iter()
            .map(|point| Self::point_to_snapshot(currency, point))
            .collect();
        self.repository.save_snapshots(&snapshots)?;

        self.repository.find_in_range(currency, start, end)
    }

    fn cache_status(&self) -> Result<RateCacheStatus> {
        Ok(RateCacheStatus {
            total_snapshots: self.repository.count()?,
            latest: self.repository.latest(CACHE_STATUS_PREVIEW_ROWS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::errors::Error;
    use crate::rates::rates_provider::FixingRate;
    use crate::rates::rates_repository::RateRepository;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Provider double: serves canned tables/points and records every call.
    struct StubProvider {
        tables: HashMap<NaiveDate, FixingTable>,
        points: HashMap<(String, NaiveDate), FixingPoint>,
        series: Vec<FixingPoint>,
        unreachable: bool,
        table_calls: AtomicUsize,
        rate_calls: AtomicUsize,
        series_calls: AtomicUsize,
        requested_dates: StdMutex<Vec<NaiveDate>>,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                tables: HashMap::new(),
                points: HashMap::new(),
                series: Vec::new(),
                unreachable: false,
                table_calls: AtomicUsize::new(0),
                rate_calls: AtomicUsize::new(0),
                series_calls: AtomicUsize::new(0),
                requested_dates: StdMutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            let mut stub = Self::new();
            stub.unreachable = true;
            stub
        }

        fn with_table(mut self, date: NaiveDate, rates: &[(&str, Decimal)]) -> Self {
            self.tables.insert(
                date,
                FixingTable {
                    date,
                    rates: rates
                        .iter()
                        .map(|(code, mid)| FixingRate {
                            code: code.to_string(),
                            mid: *mid,
                            bid: None,
                            ask: None,
                        })
                        .collect(),
                },
            );
            self
        }

        fn with_point(mut self, currency: &str, date: NaiveDate, mid: Decimal) -> Self {
            self.points.insert(
                (currency.to_string(), date),
                FixingPoint {
                    date,
                    mid,
                    bid: None,
                    ask: None,
                },
            );
            self
        }

        fn with_series(mut self, points: Vec<FixingPoint>) -> Self {
            self.series = points;
            self
        }
    }

    #[async_trait]
    impl FixingProvider for StubProvider {
        async fn fetch_table(&self, date: NaiveDate) -> std::result::Result<FixingTable, RateError> {
            self.table_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_dates.lock().unwrap().push(date);
            if self.unreachable {
                return Err(RateError::UpstreamUnavailable("connection refused".into()));
            }
            self.tables
                .get(&date)
                .cloned()
                .ok_or_else(|| RateError::RateNotFound(format!("no table for {}", date)))
        }

        async fn fetch_rate(
            &self,
            currency: &str,
            date: NaiveDate,
        ) -> std::result::Result<FixingPoint, RateError> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            if self.unreachable {
                return Err(RateError::UpstreamUnavailable("connection refused".into()));
            }
            self.points
                .get(&(currency.to_string(), date))
                .cloned()
                .ok_or_else(|| {
                    RateError::RateNotFound(format!("no fixing for {} on {}", currency, date))
                })
        }

        async fn fetch_series(
            &self,
            _currency: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> std::result::Result<Vec<FixingPoint>, RateError> {
            self.series_calls.fetch_add(1, Ordering::SeqCst);
            if self.unreachable {
                return Err(RateError::UpstreamUnavailable("connection refused".into()));
            }
            if self.series.is_empty() {
                return Err(RateError::RateNotFound("no fixings in range".into()));
            }
            Ok(self.series.clone())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_with(provider: StubProvider) -> (RateService, Arc<StubProvider>) {
        let pool = db::create_pool_with_size(":memory:", 1).unwrap();
        db::run_migrations(&pool).unwrap();
        let repository = Arc::new(RateRepository::new(pool));
        let provider = Arc::new(provider);
        (
            RateService::new(repository, provider.clone()),
            provider,
        )
    }

    #[tokio::test]
    async fn second_call_same_day_is_served_from_cache() {
        let wednesday = date(2024, 1, 10);
        let (service, provider) =
            service_with(StubProvider::new().with_table(wednesday, &[("EUR", dec!(4.34))]));

        let first = service
            .get_current_rates_from(false, wednesday)
            .await
            .unwrap();
        let second = service
            .get_current_rates_from(false, wednesday)
            .await
            .unwrap();

        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.len(), 1);
        assert_eq!(second[0].currency, "EUR");
        assert_eq!(second[0].mid, dec!(4.34));
    }

    #[tokio::test]
    async fn force_refresh_hits_the_provider_again() {
        let wednesday = date(2024, 1, 10);
        let (service, provider) =
            service_with(StubProvider::new().with_table(wednesday, &[("EUR", dec!(4.34))]));

        service
            .get_current_rates_from(false, wednesday)
            .await
            .unwrap();
        service
            .get_current_rates_from(true, wednesday)
            .await
            .unwrap();

        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backward_walk_skips_weekend_days() {
        let sunday = date(2024, 1, 7);
        let friday = date(2024, 1, 5);
        let (service, provider) =
            service_with(StubProvider::new().with_table(friday, &[("USD", dec!(3.98))]));

        let rates = service.get_current_rates_from(false, sunday).await.unwrap();

        // Sunday and Saturday are skipped without touching the provider
        let requested = provider.requested_dates.lock().unwrap().clone();
        assert_eq!(requested, vec![friday]);
        assert_eq!(rates[0].date, friday);
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back_to_cached_table() {
        let wednesday = date(2024, 1, 10);
        let three_days_ago = date(2024, 1, 7);
        let (service, provider) = service_with(StubProvider::unreachable());

        // Seed a stale table, as if fetched three days earlier
        let seeded = NewRateSnapshot {
            currency: "EUR".to_string(),
            date: three_days_ago,
            mid: dec!(4.31),
            bid: dec!(4.31),
            ask: dec!(4.31),
        };
        service
            .repository
            .save_snapshots(std::slice::from_ref(&seeded))
            .unwrap();

        let rates = service
            .get_current_rates_from(false, wednesday)
            .await
            .unwrap();

        assert!(provider.table_calls.load(Ordering::SeqCst) > 0);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].date, three_days_ago);
        assert_eq!(rates[0].mid, dec!(4.31));
    }

    #[tokio::test]
    async fn unreachable_upstream_with_empty_cache_fails() {
        let wednesday = date(2024, 1, 10);
        let (service, _provider) = service_with(StubProvider::unreachable());

        let err = service
            .get_current_rates_from(false, wednesday)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Rate(RateError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn walk_is_bounded_to_the_lookback_window() {
        let wednesday = date(2024, 1, 10);
        let (service, provider) = service_with(StubProvider::unreachable());

        let _ = service.get_current_rates_from(false, wednesday).await;

        // 7 calendar days back from a Wednesday contain exactly 5 weekdays
        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn historical_rate_is_cached_after_first_fetch() {
        let friday = date(2024, 1, 5);
        let (service, provider) =
            service_with(StubProvider::new().with_point("USD", friday, dec!(3.98)));

        let first = service.get_historical_rate("USD", friday).await.unwrap();
        let second = service.get_historical_rate("USD", friday).await.unwrap();

        assert_eq!(provider.rate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.mid, dec!(3.98));
        assert_eq!(second.mid, dec!(3.98));
    }

    #[tokio::test]
    async fn historical_rate_on_a_saturday_is_not_found() {
        // 2024-01-06 is a Saturday: no fixing was ever published
        let saturday = date(2024, 1, 6);
        let (service, _provider) = service_with(StubProvider::new());

        let err = service.get_historical_rate("USD", saturday).await.unwrap_err();

        assert!(matches!(err, Error::Rate(RateError::RateNotFound(_))));
    }

    #[tokio::test]
    async fn period_is_served_from_cache_when_any_rows_exist() {
        let (service, provider) = service_with(StubProvider::new());
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 31);

        let seeded = NewRateSnapshot {
            currency: "EUR".to_string(),
            date: date(2024, 1, 15),
            mid: dec!(4.33),
            bid: dec!(4.33),
            ask: dec!(4.33),
        };
        service
            .repository
            .save_snapshots(std::slice::from_ref(&seeded))
            .unwrap();

        let rates = service
            .get_rates_for_period("EUR", start, end)
            .await
            .unwrap();

        assert_eq!(provider.series_calls.load(Ordering::SeqCst), 0);
        assert_eq!(rates.len(), 1);
    }

    #[tokio::test]
    async fn period_fetches_and_persists_every_point_on_cache_miss() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 5);
        let points = vec![
            FixingPoint {
                date: date(2024, 1, 2),
                mid: dec!(4.31),
                bid: None,
                ask: None,
            },
            FixingPoint {
                date: date(2024, 1, 3),
                mid: dec!(4.32),
                bid: None,
                ask: None,
            },
        ];
        let (service, provider) = service_with(StubProvider::new().with_series(points));

        let rates = service
            .get_rates_for_period("EUR", start, end)
            .await
            .unwrap();

        assert_eq!(provider.series_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].date, date(2024, 1, 2));

        // Second call over the same range is now a cache hit
        service
            .get_rates_for_period("EUR", start, end)
            .await
            .unwrap();
        assert_eq!(provider.series_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_status_reports_totals() {
        let (service, _provider) = service_with(StubProvider::new());

        let status = service.cache_status().unwrap();
        assert_eq!(status.total_snapshots, 0);
        assert!(status.latest.is_empty());
    }
}
