//! Check-in ledger: the source of truth for "did user X check in on day Y".
//!
//! A successful check-in performs three writes in order: the ledger row,
//! the point-history accrual, the balance update. They are sequential
//! awaits, not a transaction; the unique index on (user, kind, window day)
//! is what keeps a racing duplicate from producing two ledger rows.

use chrono::NaiveDate;
use shared::{CheckinKind, DayStatusDto, PointEntryKind};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::{CheckinRecord, CheckinSnapshot, PointHistoryEntry};
use crate::error::{ApiError, ApiResult};
use crate::storage::{is_unique_violation, CheckinRepository, PointHistoryRepository};

use super::point_service::{PointService, CHECKIN_REWARD};
use super::time_window::{Clock, TimeWindows};

#[derive(Clone)]
pub struct CheckinService {
    checkins: CheckinRepository,
    histories: PointHistoryRepository,
    points: PointService,
    windows: TimeWindows,
    clock: Arc<dyn Clock>,
}

impl CheckinService {
    pub fn new(
        checkins: CheckinRepository,
        histories: PointHistoryRepository,
        points: PointService,
        windows: TimeWindows,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            checkins,
            histories,
            points,
            windows,
            clock,
        }
    }

    /// Record a live check-in for the current moment.
    pub async fn record(&self, user_id: &str, kind: CheckinKind) -> ApiResult<CheckinRecord> {
        let now = self.clock.now_utc();
        if !self.windows.is_within(kind, now) {
            return Err(ApiError::CheckinTimeNotAvailable);
        }

        let window = self.windows.window_for(kind, now);
        if self
            .checkins
            .find_in_window(user_id, kind, &window)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyCheckedIn);
        }

        let record = CheckinRecord::new(user_id, kind, now, self.windows.local_date(now), now);
        self.insert_and_accrue(record).await
    }

    /// Admin path: record a check-in on an arbitrary calendar day, pinned to
    /// the window start. No time-of-day gate; the dedupe still applies.
    pub async fn record_backdated(
        &self,
        user_id: &str,
        kind: CheckinKind,
        date: NaiveDate,
    ) -> ApiResult<CheckinRecord> {
        let window = self.windows.window_on(kind, date);
        if self
            .checkins
            .find_in_window(user_id, kind, &window)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyCheckedIn);
        }

        let record = CheckinRecord::new(user_id, kind, window.start, date, self.clock.now_utc());
        self.insert_and_accrue(record).await
    }

    async fn insert_and_accrue(&self, record: CheckinRecord) -> ApiResult<CheckinRecord> {
        match self.checkins.insert(&record).await {
            Ok(()) => {}
            // A concurrent request won the race between dedupe and insert.
            Err(e) if is_unique_violation(&e) => return Err(ApiError::AlreadyCheckedIn),
            Err(e) => return Err(e.into()),
        }

        let entry = PointHistoryEntry::new(
            &record.user_id,
            CHECKIN_REWARD,
            PointEntryKind::In,
            Some(CheckinSnapshot {
                checkin_at: record.checkin_at,
                kind: record.kind,
            }),
            record.created_at,
        );
        self.histories.append(&entry).await?;
        self.points.add(&record.user_id, CHECKIN_REWARD).await?;

        info!(
            user_id = %record.user_id,
            kind = %record.kind,
            "check-in recorded"
        );
        Ok(record)
    }

    /// True iff a check-in of `kind` exists inside that day's window.
    pub async fn has_checked_in(
        &self,
        user_id: &str,
        kind: CheckinKind,
        day: NaiveDate,
    ) -> ApiResult<bool> {
        let window = self.windows.window_on(kind, day);
        Ok(self
            .checkins
            .find_in_window(user_id, kind, &window)
            .await?
            .is_some())
    }

    /// Check-ins of a month, newest first. With an explicit month filter an
    /// empty result is NotFound; without one (the statistics path) it is an
    /// ordinary empty list. The asymmetry is part of the API contract.
    pub async fn history_for_month(
        &self,
        user_id: &str,
        filter: Option<(i32, u32)>,
    ) -> ApiResult<Vec<CheckinRecord>> {
        let (year, month) = match filter {
            Some(ym) => ym,
            None => {
                let today = self.windows.local_date(self.clock.now_utc());
                use chrono::Datelike;
                (today.year(), today.month())
            }
        };

        let (start, end) = self
            .windows
            .month_range(year, month)
            .ok_or(ApiError::Validation("DATE_INVALID"))?;
        let records = self.checkins.list_between(user_id, start, end, true).await?;

        if filter.is_some() && records.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(records)
    }

    /// Point ledger entries of the current month, newest first. Empty is
    /// NotFound on this endpoint.
    pub async fn point_history(&self, user_id: &str) -> ApiResult<Vec<PointHistoryEntry>> {
        use chrono::Datelike;
        let today = self.windows.local_date(self.clock.now_utc());
        let (start, end) = self
            .windows
            .month_range(today.year(), today.month())
            .ok_or(ApiError::Validation("DATE_INVALID"))?;

        let entries = self
            .histories
            .list_between_desc(user_id, start, end)
            .await?;
        if entries.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(entries)
    }

    /// Both-window completion for one local day, independent of "now".
    pub async fn status_by_date(&self, user_id: &str, date: NaiveDate) -> ApiResult<DayStatusDto> {
        Ok(DayStatusDto {
            date,
            morning: self.has_checked_in(user_id, CheckinKind::Morning, date).await?,
            evening: self.has_checked_in(user_id, CheckinKind::Evening, date).await?,
        })
    }

    /// Per-day status for every date in `[first, last]`, one query for the
    /// whole range.
    pub async fn statuses_for_range(
        &self,
        user_id: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> ApiResult<Vec<DayStatusDto>> {
        let (start, _) = self.windows.day_range(first);
        let (_, end) = self.windows.day_range(last);
        let records = self
            .checkins
            .list_between(user_id, start, end, false)
            .await?;

        let mut statuses = Vec::new();
        let mut date = first;
        while date <= last {
            let mut status = DayStatusDto {
                date,
                morning: false,
                evening: false,
            };
            for record in records.iter().filter(|r| r.window_date == date) {
                match record.kind {
                    CheckinKind::Morning => status.morning = true,
                    CheckinKind::Evening => status.evening = true,
                }
            }
            statuses.push(status);
            date += chrono::Duration::days(1);
        }
        Ok(statuses)
    }

    /// One status per calendar day of the current local month.
    pub async fn status_for_current_month(&self, user_id: &str) -> ApiResult<Vec<DayStatusDto>> {
        use chrono::Datelike;
        let today = self.windows.local_date(self.clock.now_utc());
        let days = super::time_window::days_in_month(today.year(), today.month())
            .ok_or(ApiError::Validation("DATE_INVALID"))?;
        let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .ok_or(ApiError::Validation("DATE_INVALID"))?;
        let last = NaiveDate::from_ymd_opt(today.year(), today.month(), days)
            .ok_or(ApiError::Validation("DATE_INVALID"))?;
        self.statuses_for_range(user_id, first, last).await
    }

    /// Number of ledger rows (both kinds) inside a calendar month.
    pub async fn count_in_month(&self, user_id: &str, year: i32, month: u32) -> ApiResult<i64> {
        let (start, end) = self
            .windows
            .month_range(year, month)
            .ok_or(ApiError::Validation("DATE_INVALID"))?;
        Ok(self.checkins.count_between(user_id, start, end).await?)
    }
}
