use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use shared::CheckinKind;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::domain::models::CheckinRecord;
use crate::domain::time_window::Window;

#[derive(Clone)]
pub struct CheckinRepository {
    pool: Arc<SqlitePool>,
}

impl CheckinRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Insert a new check-in. The unique index on (user, kind, window day)
    /// makes a lost duplicate race surface here as a constraint violation.
    pub async fn insert(&self, record: &CheckinRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO checkins (id, user_id, kind, checkin_at, window_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(record.kind.as_str())
        .bind(record.checkin_at)
        .bind(record.window_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_in_window(
        &self,
        user_id: &str,
        kind: CheckinKind,
        window: &Window,
    ) -> Result<Option<CheckinRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, kind, checkin_at, window_date, created_at, updated_at
            FROM checkins
            WHERE user_id = ? AND kind = ? AND checkin_at >= ? AND checkin_at < ?
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    /// Check-ins of both kinds inside `[start, end)`, ordered by checkin_at.
    pub async fn list_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        descending: bool,
    ) -> Result<Vec<CheckinRecord>> {
        let sql = if descending {
            r#"
            SELECT id, user_id, kind, checkin_at, window_date, created_at, updated_at
            FROM checkins
            WHERE user_id = ? AND checkin_at >= ? AND checkin_at < ?
            ORDER BY checkin_at DESC
            "#
        } else {
            r#"
            SELECT id, user_id, kind, checkin_at, window_date, created_at, updated_at
            FROM checkins
            WHERE user_id = ? AND checkin_at >= ? AND checkin_at < ?
            ORDER BY checkin_at ASC
            "#
        };

        let rows = sqlx::query(sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&*self.pool)
            .await?;

        rows.iter().map(map_row).collect()
    }

    pub async fn count_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM checkins WHERE user_id = ? AND checkin_at >= ? AND checkin_at < ?",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&*self.pool)
        .await?;

        Ok(row.get("n"))
    }
}

fn map_row(row: &SqliteRow) -> Result<CheckinRecord> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<CheckinKind>()
        .map_err(|e| anyhow!("corrupt checkins row: {e}"))?;
    let window_date: NaiveDate = row.try_get("window_date")?;

    Ok(CheckinRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        kind,
        checkin_at: row.try_get("checkin_at")?,
        window_date,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{is_unique_violation, DbConnection};
    use chrono::TimeZone;

    fn record_at(user_id: &str, kind: CheckinKind, hour: u32) -> CheckinRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap();
        CheckinRecord::new(
            user_id,
            kind,
            at,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            at,
        )
    }

    #[tokio::test]
    async fn insert_and_find_in_window() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.checkins();

        let record = record_at("user-1", CheckinKind::Morning, 2);
        repo.insert(&record).await.unwrap();

        let window = Window {
            start: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap(),
        };
        let found = repo
            .find_in_window("user-1", CheckinKind::Morning, &window)
            .await
            .unwrap();
        assert_eq!(found, Some(record));

        // Same window, other kind: no match.
        let other = repo
            .find_in_window("user-1", CheckinKind::Evening, &window)
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn duplicate_window_day_violates_unique_index() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.checkins();

        repo.insert(&record_at("user-1", CheckinKind::Morning, 2))
            .await
            .unwrap();
        let err = repo
            .insert(&record_at("user-1", CheckinKind::Morning, 3))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        // Evening on the same day is a different slot.
        repo.insert(&record_at("user-1", CheckinKind::Evening, 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_between_orders_by_checkin_at() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.checkins();

        repo.insert(&record_at("user-1", CheckinKind::Morning, 2))
            .await
            .unwrap();
        repo.insert(&record_at("user-1", CheckinKind::Evening, 10))
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let asc = repo.list_between("user-1", start, end, false).await.unwrap();
        assert_eq!(asc.len(), 2);
        assert!(asc[0].checkin_at < asc[1].checkin_at);

        let desc = repo.list_between("user-1", start, end, true).await.unwrap();
        assert!(desc[0].checkin_at > desc[1].checkin_at);

        assert_eq!(repo.count_between("user-1", start, end).await.unwrap(), 2);
    }
}
