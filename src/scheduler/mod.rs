use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::rates::RateServiceTrait;

/// True on workday ticks inside the configured refresh hour.
fn is_refresh_window(now: NaiveDateTime, refresh_hour: u32) -> bool {
    let workday = !matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
    workday && now.hour() == refresh_hour
}

/// Spawns the daily fixing refresh: an hourly tick that force-refreshes the
/// rate cache on workdays at `refresh_hour` local time. Refresh failures
/// are logged and never take the task down.
pub fn spawn_daily_refresh(
    rate_service: Arc<dyn RateServiceTrait>,
    refresh_hour: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Scheduled daily rate refresh (workdays, {}:00 local time)",
            refresh_hour
        );

        loop {
            ticker.tick().await;

            if !is_refresh_window(Local::now().naive_local(), refresh_hour) {
                continue;
            }

            match rate_service.get_current_rates(true).await {
                Ok(rates) => info!("Daily rate refresh stored {} fixings", rates.len()),
                Err(e) => warn!("Daily rate refresh failed: {}", e),
            }
        }
    })
}
