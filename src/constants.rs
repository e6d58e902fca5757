/// Currency that deposits are credited to and exchanges are quoted against.
pub const HOME_CURRENCY: &str = "PLN";

/// Base URL of the National Bank of Poland exchange rate API.
pub const NBP_API_BASE_URL: &str = "https://api.nbp.pl/api/exchangerates";

/// How many calendar days the resolver walks backward looking for a
/// published fixing table before degrading to the cache.
pub const RATE_LOOKBACK_DAYS: i64 = 7;

/// Number of most recent snapshots included in a cache status report.
pub const CACHE_STATUS_PREVIEW_ROWS: i64 = 10;

/// Hour of day (local time) at which the scheduled refresh runs on workdays.
pub const DAILY_REFRESH_HOUR: u32 = 12;
