use chrono::NaiveDate;
use diesel::dsl::max;
use diesel::prelude::*;
use std::sync::Arc;

use super::rates_model::{NewRateSnapshot, RateSnapshot, RateSnapshotDB};
use super::rates_traits::RateRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::exchange_rates;

/// Diesel-backed store for rate snapshots.
pub struct RateRepository {
    pool: Arc<DbPool>,
}

impl RateRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl RateRepositoryTrait for RateRepository {
    fn has_snapshots_for(&self, date: NaiveDate) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = exchange_rates::table
            .filter(exchange_rates::date.eq(date))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    fn latest_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let latest = exchange_rates::table
            .select(max(exchange_rates::date))
            .first::<Option<NaiveDate>>(&mut conn)?;

        Ok(latest)
    }

    fn snapshots_for_latest_date(&self) -> Result<Vec<RateSnapshot>> {
        match self.latest_date()? {
            Some(date) => self.snapshots_for_date(date),
            None => Ok(Vec::new()),
        }
    }

    fn snapshots_for_date(&self, date: NaiveDate) -> Result<Vec<RateSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = exchange_rates::table
            .filter(exchange_rates::date.eq(date))
            .order_by(exchange_rates::currency.asc())
            .load::<RateSnapshotDB>(&mut conn)?;

        Ok(rows.into_iter().map(RateSnapshot::from).collect())
    }

    fn find(&self, currency: &str, date: NaiveDate) -> Result<Option<RateSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let row = exchange_rates::table
            .filter(exchange_rates::currency.eq(currency))
            .filter(exchange_rates::date.eq(date))
            .first::<RateSnapshotDB>(&mut conn)
            .optional()?;

        Ok(row.map(RateSnapshot::from))
    }

    fn find_in_range(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RateSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = exchange_rates::table
            .filter(exchange_rates::currency.eq(currency))
            .filter(exchange_rates::date.ge(start))
            .filter(exchange_rates::date.le(end))
            .order_by(exchange_rates::date.asc())
            .load::<RateSnapshotDB>(&mut conn)?;

        Ok(rows.into_iter().map(RateSnapshot::from).collect())
    }

    fn save_snapshots(&self, snapshots: &[NewRateSnapshot]) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let mut inserted = 0;
        for snapshot in snapshots {
            let row = RateSnapshotDB::from(snapshot.clone());
            // First write wins: an existing (currency, date) row is never touched
            inserted += diesel::insert_into(exchange_rates::table)
                .values(&row)
                .on_conflict((exchange_rates::currency, exchange_rates::date))
                .do_nothing()
                .execute(&mut conn)?;
        }

        Ok(inserted)
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        Ok(exchange_rates::table.count().get_result(&mut conn)?)
    }

    fn latest(&self, limit: i64) -> Result<Vec<RateSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = exchange_rates::table
            .order_by((exchange_rates::date.desc(), exchange_rates::currency.asc()))
            .limit(limit)
            .load::<RateSnapshotDB>(&mut conn)?;

        Ok(rows.into_iter().map(RateSnapshot::from).collect())
    }
}
