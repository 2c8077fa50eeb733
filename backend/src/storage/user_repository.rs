use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use shared::LeaderboardEntryDto;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::domain::models::{RegionType, Role, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<SqlitePool>,
}

impl UserRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, birth_date, sex, parent_name,
                 province_id, city_id, district_id, subdistrict_id,
                 role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.birth_date)
        .bind(&user.sex)
        .bind(&user.parent_name)
        .bind(&user.province_id)
        .bind(&user.city_id)
        .bind(&user.district_id)
        .bind(&user.subdistrict_id)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&*self.pool)
            .await?;

        row.as_ref().map(map_row).transpose()
    }

    /// Ids of every registered user, the settlement scan set.
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM users ORDER BY created_at ASC")
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    pub async fn list_ids_by_region(
        &self,
        region: RegionType,
        region_id: &str,
    ) -> Result<Vec<String>> {
        // Column name comes from the RegionType enum, never from input.
        let sql = format!("SELECT id FROM users WHERE {} = ?", region.column());
        let rows = sqlx::query(&sql)
            .bind(region_id)
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    /// Users ranked by point balance, streak day carried along.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntryDto>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name,
                   COALESCE(p.point, 0) AS total_point,
                   COALESCE(c.day, 0) AS consecutive_day
            FROM users u
            LEFT JOIN point_accounts p ON p.user_id = u.id
            LEFT JOIN consecutive_checkins c ON c.user_id = u.id
            ORDER BY total_point DESC, u.name ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| LeaderboardEntryDto {
                user_id: r.get("id"),
                name: r.get("name"),
                total_point: r.get("total_point"),
                consecutive_day: r.get("consecutive_day"),
            })
            .collect())
    }
}

fn map_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| anyhow!("corrupt users row: {e}"))?;
    let birth_date: Option<NaiveDate> = row.try_get("birth_date")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        birth_date,
        sex: row.try_get("sex")?,
        parent_name: row.try_get("parent_name")?,
        province_id: row.try_get("province_id")?,
        city_id: row.try_get("city_id")?,
        district_id: row.try_get("district_id")?,
        subdistrict_id: row.try_get("subdistrict_id")?,
        role,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
