use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::domain::models::StreakState;

#[derive(Clone)]
pub struct StreakRepository {
    pool: Arc<SqlitePool>,
}

impl StreakRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<StreakState>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, day, last_break, consecutive_day_record, created_at, updated_at
            FROM consecutive_checkins
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| StreakState {
            user_id: r.get("user_id"),
            day: r.get("day"),
            last_break: r.get("last_break"),
            consecutive_day_record: r.get("consecutive_day_record"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn insert(&self, state: &StreakState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO consecutive_checkins
                (user_id, day, last_break, consecutive_day_record, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&state.user_id)
        .bind(state.day)
        .bind(state.last_break)
        .bind(state.consecutive_day_record)
        .bind(state.created_at)
        .bind(state.updated_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(
        &self,
        user_id: &str,
        day: i64,
        last_break: Option<DateTime<Utc>>,
        consecutive_day_record: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE consecutive_checkins
            SET day = ?, last_break = ?, consecutive_day_record = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(day)
        .bind(last_break)
        .bind(consecutive_day_record)
        .bind(now)
        .bind(user_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }
}
