use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One persisted daily fixing for a single currency. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    pub id: String,
    pub currency: String,
    pub date: NaiveDate,
    pub mid: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub created_at: NaiveDateTime,
}

/// Input model for persisting a freshly fetched fixing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRateSnapshot {
    pub currency: String,
    pub date: NaiveDate,
    pub mid: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
}

/// Summary of what the local rate cache currently holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCacheStatus {
    pub total_snapshots: i64,
    pub latest: Vec<RateSnapshot>,
}

/// Database model for rate snapshots
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RateSnapshotDB {
    pub id: String,
    pub currency: String,
    pub date: NaiveDate,
    pub mid: String,
    pub bid: String,
    pub ask: String,
    pub created_at: NaiveDateTime,
}

impl From<RateSnapshotDB> for RateSnapshot {
    fn from(db: RateSnapshotDB) -> Self {
        Self {
            id: db.id,
            currency: db.currency,
            date: db.date,
            mid: Decimal::from_str(&db.mid).unwrap_or_default(),
            bid: Decimal::from_str(&db.bid).unwrap_or_default(),
            ask: Decimal::from_str(&db.ask).unwrap_or_default(),
            created_at: db.created_at,
        }
    }
}

impl From<NewRateSnapshot> for RateSnapshotDB {
    fn from(domain: NewRateSnapshot) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            currency: domain.currency,
            date: domain.date,
            mid: domain.mid.to_string(),
            bid: domain.bid.to_string(),
            ask: domain.ask.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
