//! Domain model for the consecutive check-in streak.

use chrono::{DateTime, FixedOffset, Utc};
use shared::ConsecutiveCheckinDto;

/// Per-user streak state. `day` is the running consecutive-day count,
/// `consecutive_day_record` the high-water mark of past streaks.
#[derive(Debug, Clone, PartialEq)]
pub struct StreakState {
    pub user_id: String,
    pub day: i64,
    pub last_break: Option<DateTime<Utc>>,
    pub consecutive_day_record: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StreakState {
    pub fn to_dto(&self, offset: FixedOffset) -> ConsecutiveCheckinDto {
        ConsecutiveCheckinDto {
            day: self.day,
            last_break: self.last_break.map(|t| t.with_timezone(&offset)),
            consecutive_day_record: self.consecutive_day_record,
        }
    }
}
