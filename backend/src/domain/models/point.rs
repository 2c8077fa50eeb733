//! Domain models for the point account and its audit trail.

use chrono::{DateTime, FixedOffset, Utc};
use shared::{CheckinKind, CheckinSnapshotDto, PointEntryKind, PointHistoryDto};
use uuid::Uuid;

/// Current bounded balance for one user. One row per user, updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAccount {
    pub user_id: String,
    pub point: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Embedded copy of the check-in that triggered an accrual entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinSnapshot {
    pub checkin_at: DateTime<Utc>,
    pub kind: CheckinKind,
}

/// Append-only record of a single balance delta.
#[derive(Debug, Clone, PartialEq)]
pub struct PointHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub point: i64,
    pub kind: PointEntryKind,
    pub checkin: Option<CheckinSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl PointHistoryEntry {
    pub fn new(
        user_id: &str,
        point: i64,
        kind: PointEntryKind,
        checkin: Option<CheckinSnapshot>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            point,
            kind,
            checkin,
            created_at: now,
        }
    }

    pub fn to_dto(&self, offset: FixedOffset) -> PointHistoryDto {
        PointHistoryDto {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            point: self.point,
            kind: self.kind,
            checkin: self.checkin.as_ref().map(|snapshot| CheckinSnapshotDto {
                checkin_at: snapshot.checkin_at.with_timezone(&offset),
                kind: snapshot.kind,
            }),
            created_at: self.created_at.with_timezone(&offset),
        }
    }
}
