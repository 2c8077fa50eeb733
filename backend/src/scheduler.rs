//! In-process daily trigger for the settlement job.
//!
//! Sleeps until the next local occurrence of the configured wall-clock time,
//! runs the settlement, repeats. Job errors are logged and never kill the
//! loop; an external scheduler can drive `SettlementService::run_for_day`
//! directly instead of spawning this.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{Clock, SettlementService, TimeWindows};

pub fn spawn(
    settlement: SettlementService,
    windows: TimeWindows,
    clock: Arc<dyn Clock>,
    run_at: NaiveTime,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = clock.now_utc();
            let next = next_run_after(now, windows, run_at);
            info!(next = %next, "next settlement scheduled");

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            match settlement.run().await {
                Ok(outcome) => info!(
                    settled = outcome.settled,
                    failed = outcome.failed,
                    "scheduled settlement completed"
                ),
                Err(e) => error!("scheduled settlement failed: {e:#}"),
            }
        }
    })
}

/// First instant strictly after `now` where local wall-clock time is `run_at`.
pub fn next_run_after(now: DateTime<Utc>, windows: TimeWindows, run_at: NaiveTime) -> DateTime<Utc> {
    let today = windows.local_date(now);
    let candidate = windows.at_local(today, run_at);
    if candidate > now {
        candidate
    } else {
        windows.at_local(today + Duration::days(1), run_at)
    }
}
