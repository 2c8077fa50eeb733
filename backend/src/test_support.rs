//! Shared fixtures: every service wired over one in-memory database and a
//! settable clock.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::sync::Arc;

use crate::auth::{IdentityProvider, StoreTokenIdentity};
use crate::domain::time_window::FixedClock;
use crate::domain::{
    CheckinService, Clock, PointService, RewardService, SettlementService, StatsService,
    StreakService, TimeWindows,
};
use crate::rest::AppState;
use crate::storage::{DbConnection, TokenRepository, UserRepository};

/// A WIB (UTC+7) wall-clock moment expressed as UTC.
pub fn wib_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub struct TestBackend {
    pub clock: Arc<FixedClock>,
    pub windows: TimeWindows,
    pub checkins: CheckinService,
    pub points: PointService,
    pub streaks: StreakService,
    pub stats: StatsService,
    pub rewards: RewardService,
    pub settlement: SettlementService,
    pub users: UserRepository,
    pub tokens: TokenRepository,
}

impl TestBackend {
    pub async fn at(now: DateTime<Utc>) -> Self {
        let db = DbConnection::init_test().await.unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let windows = TimeWindows::new(7);

        let points = PointService::new(db.point_accounts(), shared_clock.clone());
        let checkins = CheckinService::new(
            db.checkins(),
            db.point_histories(),
            points.clone(),
            windows,
            shared_clock.clone(),
        );
        let streaks = StreakService::new(db.streaks(), shared_clock.clone());
        let stats = StatsService::new(
            checkins.clone(),
            points.clone(),
            streaks.clone(),
            db.users(),
            windows,
            shared_clock.clone(),
        );
        let rewards = RewardService::new(
            db.rewards(),
            db.redemptions(),
            points.clone(),
            db.point_histories(),
            shared_clock.clone(),
        );
        let settlement = SettlementService::new(
            db.users(),
            checkins.clone(),
            points.clone(),
            db.point_histories(),
            streaks.clone(),
            windows,
            shared_clock.clone(),
        );

        Self {
            users: db.users(),
            tokens: db.tokens(),
            clock,
            windows,
            checkins,
            points,
            streaks,
            stats,
            rewards,
            settlement,
        }
    }

    /// Handler-facing state over the same services.
    pub fn state(&self) -> AppState {
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(StoreTokenIdentity::new(self.tokens.clone()));
        AppState {
            checkins: self.checkins.clone(),
            streaks: self.streaks.clone(),
            stats: self.stats.clone(),
            rewards: self.rewards.clone(),
            users: self.users.clone(),
            identity,
            windows: self.windows,
            clock: self.clock.clone(),
        }
    }
}
