use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::rates_errors::RateError;
use crate::constants::NBP_API_BASE_URL;

/// One row of a daily fixing table. Table A carries only the mid rate, so
/// bid/ask may be absent.
#[derive(Debug, Clone)]
pub struct FixingRate {
    pub code: String,
    pub mid: Decimal,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
}

/// A full fixing table for one publication date.
#[derive(Debug, Clone)]
pub struct FixingTable {
    pub date: NaiveDate,
    pub rates: Vec<FixingRate>,
}

/// A single dated fixing for one currency.
#[derive(Debug, Clone)]
pub struct FixingPoint {
    pub date: NaiveDate,
    pub mid: Decimal,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
}

/// Upstream daily-fixing data source.
///
/// `RateNotFound` means the provider answered but publishes no fixing for
/// the requested point (weekend, holiday); everything else that stops a
/// fetch is `UpstreamUnavailable`.
#[async_trait]
pub trait FixingProvider: Send + Sync {
    async fn fetch_table(&self, date: NaiveDate) -> Result<FixingTable, RateError>;
    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<FixingPoint, RateError>;
    async fn fetch_series(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FixingPoint>, RateError>;
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NbpTableResponse {
    effective_date: NaiveDate,
    rates: Vec<NbpTableRate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NbpTableRate {
    code: String,
    mid: Decimal,
    #[serde(default)]
    bid: Option<Decimal>,
    #[serde(default)]
    ask: Option<Decimal>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NbpSeriesResponse {
    rates: Vec<NbpSeriesRate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NbpSeriesRate {
    effective_date: NaiveDate,
    mid: Decimal,
    #[serde(default)]
    bid: Option<Decimal>,
    #[serde(default)]
    ask: Option<Decimal>,
}

/// National Bank of Poland exchange rate API client (table A fixings).
pub struct NbpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl NbpProvider {
    pub fn new() -> Self {
        Self::with_base_url(NBP_API_BASE_URL)
    }

    /// Base URL override, used to point the client at a test server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        NbpProvider {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, RateError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RateError::UpstreamUnavailable(format!("{}: {}", context, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RateError::RateNotFound(context.to_string())),
            status if !status.is_success() => Err(RateError::UpstreamUnavailable(format!(
                "{}: HTTP {}",
                context, status
            ))),
            _ => response
                .json::<T>()
                .await
                .map_err(|e| RateError::InvalidData(format!("{}: {}", context, e))),
        }
    }
}

impl Default for NbpProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FixingProvider for NbpProvider {
    async fn fetch_table(&self, date: NaiveDate) -> Result<FixingTable, RateError> {
        let url = format!("{}/tables/A/{}?format=json", self.base_url, date);
        // The tables endpoint wraps the single table in a one-element array
        let mut tables: Vec<NbpTableResponse> = self
            .get_json(&url, &format!("fixing table for {}", date))
            .await?;

        let table = tables
            .pop()
            .ok_or_else(|| RateError::RateNotFound(format!("empty fixing table for {}", date)))?;

        Ok(FixingTable {
            date: table.effective_date,
            rates: table
                .rates
                .into_iter()
                .map(|r| FixingRate {
                    code: r.code,
                    mid: r.mid,
                    bid: r.bid,
                    ask: r.ask,
                })
                .collect(),
        })
    }

    async fn fetch_rate(&self, currency: &str, date: NaiveDate) -> Result<FixingPoint, RateError> {
        let url = format!("{}/rates/A/{}/{}?format=json", self.base_url, currency, date);
        let series: NbpSeriesResponse = self
            .get_json(&url, &format!("fixing for {} on {}", currency, date))
            .await?;

        let rate = series.rates.into_iter().next().ok_or_else(|| {
            RateError::RateNotFound(format!("no fixing for {} on {}", currency, date))
        })?;

        Ok(FixingPoint {
            date: rate.effective_date,
            mid: rate.mid,
            bid: rate.bid,
            ask: rate.ask,
        })
    }

    async fn fetch_series(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FixingPoint>, RateError> {
        let url = format!(
            "{}/rates/A/{}/{}/{}?format=json",
            self.base_url, currency, start, end
        );
        let series: NbpSeriesResponse = self
            .get_json(&url, &format!("fixings for {} {}..{}", currency, start, end))
            .await?;

        Ok(series
            .rates
            .into_iter()
            .map(|r| FixingPoint {
                date: r.effective_date,
                mid: r.mid,
                bid: r.bid,
                ask: r.ask,
            })
            .collect())
    }
}
