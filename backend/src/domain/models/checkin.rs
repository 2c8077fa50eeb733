//! Domain model for a single check-in event.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use shared::{CheckinDto, CheckinKind};
use uuid::Uuid;

/// One recorded check-in. Never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinRecord {
    pub id: String,
    pub user_id: String,
    pub kind: CheckinKind,
    pub checkin_at: DateTime<Utc>,
    /// Local calendar day of the window this check-in fell into. Backs the
    /// uniqueness constraint on (user, kind, day).
    pub window_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckinRecord {
    pub fn new(
        user_id: &str,
        kind: CheckinKind,
        checkin_at: DateTime<Utc>,
        window_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            checkin_at,
            window_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Wire representation with timestamps shifted into the app timezone.
    pub fn to_dto(&self, offset: FixedOffset) -> CheckinDto {
        CheckinDto {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            kind: self.kind,
            checkin_at: self.checkin_at.with_timezone(&offset),
            created_at: self.created_at.with_timezone(&offset),
            updated_at: self.updated_at.with_timezone(&offset),
        }
    }
}
