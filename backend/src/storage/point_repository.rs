use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use shared::{CheckinKind, PointEntryKind};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::domain::models::{CheckinSnapshot, PointAccount, PointHistoryEntry};

#[derive(Clone)]
pub struct PointAccountRepository {
    pool: Arc<SqlitePool>,
}

impl PointAccountRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<PointAccount>> {
        let row = sqlx::query(
            "SELECT user_id, point, created_at, updated_at FROM point_accounts WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| PointAccount {
            user_id: r.get("user_id"),
            point: r.get("point"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn insert(&self, user_id: &str, point: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT INTO point_accounts (user_id, point, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(point)
        .bind(now)
        .bind(now)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_point(&self, user_id: &str, point: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE point_accounts SET point = ?, updated_at = ? WHERE user_id = ?")
            .bind(point)
            .bind(now)
            .bind(user_id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PointHistoryRepository {
    pool: Arc<SqlitePool>,
}

impl PointHistoryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &PointHistoryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO point_histories (id, user_id, point, kind, checkin_at, checkin_kind, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.point)
        .bind(entry.kind.as_str())
        .bind(entry.checkin.as_ref().map(|s| s.checkin_at))
        .bind(entry.checkin.as_ref().map(|s| s.kind.as_str()))
        .bind(entry.created_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// Entries created in `[start, end)`, newest first.
    pub async fn list_between_desc(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PointHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, point, kind, checkin_at, checkin_kind, created_at
            FROM point_histories
            WHERE user_id = ? AND created_at >= ? AND created_at < ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<PointHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, point, kind, checkin_at, checkin_kind, created_at
            FROM point_histories
            WHERE user_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }
}

fn map_row(row: &SqliteRow) -> Result<PointHistoryEntry> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<PointEntryKind>()
        .map_err(|e| anyhow!("corrupt point_histories row: {e}"))?;

    let checkin_at: Option<DateTime<Utc>> = row.try_get("checkin_at")?;
    let checkin_kind: Option<String> = row.try_get("checkin_kind")?;
    let checkin = match (checkin_at, checkin_kind) {
        (Some(checkin_at), Some(raw)) => {
            let kind = raw
                .parse::<CheckinKind>()
                .map_err(|e| anyhow!("corrupt point_histories row: {e}"))?;
            Some(CheckinSnapshot { checkin_at, kind })
        }
        _ => None,
    };

    Ok(PointHistoryEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        point: row.try_get("point")?,
        kind,
        checkin,
        created_at: row.try_get("created_at")?,
    })
}
