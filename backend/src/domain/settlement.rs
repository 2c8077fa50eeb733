//! Daily settlement: the batch pass that penalizes missed windows and moves
//! streak state. Runs once per day against every registered user.

use chrono::NaiveDate;
use shared::{CheckinKind, PointEntryKind};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::models::PointHistoryEntry;
use crate::error::ApiResult;
use crate::storage::{PointHistoryRepository, UserRepository};

use super::checkin_service::CheckinService;
use super::point_service::{PointService, MISSED_WINDOW_PENALTY};
use super::streak_service::StreakService;
use super::time_window::{Clock, TimeWindows};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub settled: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct SettlementService {
    users: UserRepository,
    checkins: CheckinService,
    points: PointService,
    histories: PointHistoryRepository,
    streaks: StreakService,
    windows: TimeWindows,
    clock: Arc<dyn Clock>,
}

impl SettlementService {
    pub fn new(
        users: UserRepository,
        checkins: CheckinService,
        points: PointService,
        histories: PointHistoryRepository,
        streaks: StreakService,
        windows: TimeWindows,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            checkins,
            points,
            histories,
            streaks,
            windows,
            clock,
        }
    }

    /// Settle the current local day.
    pub async fn run(&self) -> anyhow::Result<SettlementOutcome> {
        let day = self.windows.local_date(self.clock.now_utc());
        self.run_for_day(day).await
    }

    /// Settle an explicit local day. Users are processed sequentially; a
    /// failure for one user is logged and the batch moves on, so a partial
    /// per-user write never aborts everyone after it.
    pub async fn run_for_day(&self, day: NaiveDate) -> anyhow::Result<SettlementOutcome> {
        let user_ids = self.users.list_ids().await?;
        info!(%day, users = user_ids.len(), "daily settlement started");

        let mut outcome = SettlementOutcome::default();
        for user_id in &user_ids {
            match self.settle_user(user_id, day).await {
                Ok(()) => outcome.settled += 1,
                Err(e) => {
                    error!(%user_id, %day, "settlement failed for user: {e}");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            %day,
            settled = outcome.settled,
            failed = outcome.failed,
            "daily settlement finished"
        );
        Ok(outcome)
    }

    async fn settle_user(&self, user_id: &str, day: NaiveDate) -> ApiResult<()> {
        let morning = self
            .checkins
            .has_checked_in(user_id, CheckinKind::Morning, day)
            .await?;
        let evening = self
            .checkins
            .has_checked_in(user_id, CheckinKind::Evening, day)
            .await?;

        // Each missed window costs its own penalty: missing both is -20.
        for present in [morning, evening] {
            if present {
                continue;
            }
            self.points.reduce(user_id, MISSED_WINDOW_PENALTY).await?;
            let entry = PointHistoryEntry::new(
                user_id,
                -MISSED_WINDOW_PENALTY,
                PointEntryKind::Out,
                None,
                self.clock.now_utc(),
            );
            self.histories.append(&entry).await?;
        }

        if morning || evening {
            self.streaks.advance(user_id).await?;
        } else {
            self.streaks.reset(user_id).await?;
        }
        Ok(())
    }
}
