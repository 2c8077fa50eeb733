//! Consecutive-day streak state machine.
//!
//! Transitions are driven exclusively by the daily settlement job; the live
//! check-in path never touches streak state.

use std::sync::Arc;
use tracing::debug;

use crate::domain::models::StreakState;
use crate::error::{ApiError, ApiResult};
use crate::storage::StreakRepository;

use super::time_window::Clock;

#[derive(Clone)]
pub struct StreakService {
    streaks: StreakRepository,
    clock: Arc<dyn Clock>,
}

impl StreakService {
    pub fn new(streaks: StreakRepository, clock: Arc<dyn Clock>) -> Self {
        Self { streaks, clock }
    }

    /// The user kept the streak alive today: start at 1 or increment.
    pub async fn advance(&self, user_id: &str) -> ApiResult<()> {
        let now = self.clock.now_utc();
        match self.streaks.find(user_id).await? {
            Some(state) => {
                self.streaks
                    .update(
                        user_id,
                        state.day + 1,
                        state.last_break,
                        state.consecutive_day_record,
                        now,
                    )
                    .await?;
                debug!(user_id, day = state.day + 1, "streak advanced");
            }
            None => {
                self.streaks
                    .insert(&StreakState {
                        user_id: user_id.to_string(),
                        day: 1,
                        last_break: None,
                        consecutive_day_record: 0,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// The streak broke. The high-water mark only moves when the streak
    /// being discarded beat it; the break timestamp and zeroed day are
    /// written either way.
    pub async fn reset(&self, user_id: &str) -> ApiResult<()> {
        let now = self.clock.now_utc();
        match self.streaks.find(user_id).await? {
            Some(state) => {
                let record = if state.consecutive_day_record < state.day {
                    state.day
                } else {
                    state.consecutive_day_record
                };
                self.streaks
                    .update(user_id, 0, Some(now), record, now)
                    .await?;
                debug!(user_id, record, "streak reset");
            }
            None => {
                self.streaks
                    .insert(&StreakState {
                        user_id: user_id.to_string(),
                        day: 0,
                        last_break: None,
                        consecutive_day_record: 0,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn current(&self, user_id: &str) -> ApiResult<StreakState> {
        self.streaks
            .find(user_id)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Current day count, 0 when the user has no streak row yet.
    pub async fn current_day(&self, user_id: &str) -> ApiResult<i64> {
        Ok(self
            .streaks
            .find(user_id)
            .await?
            .map(|state| state.day)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_window::FixedClock;
    use crate::storage::DbConnection;
    use chrono::{TimeZone, Utc};

    async fn service() -> (StreakService, Arc<FixedClock>) {
        let db = DbConnection::init_test().await.unwrap();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 15, 16, 30, 0).unwrap(),
        ));
        (StreakService::new(db.streaks(), clock.clone()), clock)
    }

    #[tokio::test]
    async fn advance_creates_then_increments() {
        let (streaks, _) = service().await;

        streaks.advance("user-1").await.unwrap();
        assert_eq!(streaks.current("user-1").await.unwrap().day, 1);

        streaks.advance("user-1").await.unwrap();
        streaks.advance("user-1").await.unwrap();
        let state = streaks.current("user-1").await.unwrap();
        assert_eq!(state.day, 3);
        assert_eq!(state.consecutive_day_record, 0);
        assert!(state.last_break.is_none());
    }

    #[tokio::test]
    async fn reset_records_high_water_mark_only_when_beaten() {
        let (streaks, clock) = service().await;
        let first_break = clock.now_utc();

        for _ in 0..3 {
            streaks.advance("user-1").await.unwrap();
        }
        streaks.reset("user-1").await.unwrap();

        let state = streaks.current("user-1").await.unwrap();
        assert_eq!(state.day, 0);
        assert_eq!(state.consecutive_day_record, 3);
        assert_eq!(state.last_break, Some(first_break));

        // A shorter streak does not move the record, but the break
        // timestamp still updates.
        clock.advance(chrono::Duration::days(2));
        streaks.advance("user-1").await.unwrap();
        streaks.reset("user-1").await.unwrap();

        let state = streaks.current("user-1").await.unwrap();
        assert_eq!(state.day, 0);
        assert_eq!(state.consecutive_day_record, 3);
        assert_eq!(state.last_break, Some(clock.now_utc()));
    }

    #[tokio::test]
    async fn reset_without_record_creates_empty_state() {
        let (streaks, _) = service().await;
        streaks.reset("user-1").await.unwrap();

        let state = streaks.current("user-1").await.unwrap();
        assert_eq!(state.day, 0);
        assert_eq!(state.consecutive_day_record, 0);
        assert!(state.last_break.is_none());
    }

    #[tokio::test]
    async fn current_is_not_found_without_a_row() {
        let (streaks, _) = service().await;
        assert!(matches!(
            streaks.current("user-1").await,
            Err(ApiError::NotFound)
        ));
        assert_eq!(streaks.current_day("user-1").await.unwrap(), 0);
    }
}
