//! Read-only statistics derived from the ledger, point account and streak
//! state. Nothing here mutates.

use chrono::{Datelike, Duration, NaiveDate};
use shared::{CheckinSummaryDto, LeaderboardEntryDto, WeekDayStatusDto};
use std::sync::Arc;

use crate::domain::models::RegionType;
use crate::error::{ApiError, ApiResult};
use crate::storage::UserRepository;

use super::checkin_service::CheckinService;
use super::point_service::PointService;
use super::streak_service::StreakService;
use super::time_window::{days_in_month, Clock, TimeWindows};

#[derive(Clone)]
pub struct StatsService {
    checkins: CheckinService,
    points: PointService,
    streaks: StreakService,
    users: UserRepository,
    windows: TimeWindows,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(
        checkins: CheckinService,
        points: PointService,
        streaks: StreakService,
        users: UserRepository,
        windows: TimeWindows,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            checkins,
            points,
            streaks,
            users,
            windows,
            clock,
        }
    }

    /// Completion percentage for one calendar month. The divisor 2 reflects
    /// the two possible check-ins per day: a user who only ever does one
    /// window caps near 50.
    pub async fn monthly_percentage(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> ApiResult<i64> {
        let count = self.checkins.count_in_month(user_id, year, month).await?;
        let days = days_in_month(year, month).ok_or(ApiError::Validation("DATE_INVALID"))?;
        Ok(((count as f64 / 2.0 / days as f64) * 100.0).floor() as i64)
    }

    /// The home-screen summary: balance, streak day and this month's
    /// completion percentage.
    pub async fn summary(&self, user_id: &str) -> ApiResult<CheckinSummaryDto> {
        let today = self.windows.local_date(self.clock.now_utc());
        Ok(CheckinSummaryDto {
            total_point: self.points.balance(user_id).await?,
            consecutive_check_in_day: self.streaks.current_day(user_id).await?,
            check_in_percentage: self
                .monthly_percentage(user_id, today.year(), today.month())
                .await?,
        })
    }

    /// Mean monthly percentage over every user registered in the region.
    pub async fn regional_average(
        &self,
        region: RegionType,
        region_id: &str,
        year: i32,
        month: u32,
    ) -> ApiResult<f64> {
        let user_ids = self.users.list_ids_by_region(region, region_id).await?;
        if user_ids.is_empty() {
            return Err(ApiError::NotFound);
        }

        let mut sum = 0i64;
        for user_id in &user_ids {
            sum += self.monthly_percentage(user_id, year, month).await?;
        }
        Ok(sum as f64 / user_ids.len() as f64)
    }

    /// Day-by-day completion for the ISO week (Monday..Sunday) containing
    /// the reference date, defaulting to today. `completed` counts fulfilled
    /// windows, 0 to 2.
    pub async fn weekly_status(
        &self,
        user_id: &str,
        reference: Option<NaiveDate>,
    ) -> ApiResult<Vec<WeekDayStatusDto>> {
        let date = reference.unwrap_or_else(|| self.windows.local_date(self.clock.now_utc()));
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        let sunday = monday + Duration::days(6);

        let statuses = self
            .checkins
            .statuses_for_range(user_id, monday, sunday)
            .await?;
        Ok(statuses
            .into_iter()
            .map(|status| WeekDayStatusDto {
                date: status.date,
                completed: status.morning as u8 + status.evening as u8,
            })
            .collect())
    }

    pub async fn leaderboard(&self) -> ApiResult<Vec<LeaderboardEntryDto>> {
        Ok(self.users.leaderboard().await?)
    }
}
