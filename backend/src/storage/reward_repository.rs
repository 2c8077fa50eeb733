use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::domain::models::{RedemptionRecord, Reward};

#[derive(Clone)]
pub struct RewardRepository {
    pool: Arc<SqlitePool>,
}

impl RewardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, reward: &Reward) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rewards
                (id, name, description, point, stock, is_available, photo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reward.id)
        .bind(&reward.name)
        .bind(&reward.description)
        .bind(reward.point)
        .bind(reward.stock)
        .bind(reward.is_available)
        .bind(&reward.photo)
        .bind(reward.created_at)
        .bind(reward.updated_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Reward>> {
        let row = sqlx::query("SELECT * FROM rewards WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(map_reward))
    }

    pub async fn list(&self) -> Result<Vec<Reward>> {
        let rows = sqlx::query("SELECT * FROM rewards ORDER BY created_at ASC")
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(map_reward).collect())
    }

    pub async fn update(&self, reward: &Reward) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE rewards
            SET name = ?, description = ?, point = ?, stock = ?,
                is_available = ?, photo = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&reward.name)
        .bind(&reward.description)
        .bind(reward.point)
        .bind(reward.stock)
        .bind(reward.is_available)
        .bind(&reward.photo)
        .bind(reward.updated_at)
        .bind(&reward.id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rewards WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_stock(&self, id: &str, stock: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE rewards SET stock = ?, updated_at = ? WHERE id = ?")
            .bind(stock)
            .bind(now)
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}

fn map_reward(row: &SqliteRow) -> Reward {
    Reward {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        point: row.get("point"),
        stock: row.get("stock"),
        is_available: row.get("is_available"),
        photo: row.get("photo"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// A redemption row joined with the reward fields the client renders.
#[derive(Debug, Clone)]
pub struct RedemptionWithReward {
    pub id: String,
    pub reward_id: String,
    pub reward_name: String,
    pub reward_description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RedemptionRepository {
    pool: Arc<SqlitePool>,
}

impl RedemptionRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn append(&self, record: &RedemptionRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO redemption_histories (id, user_id, reward_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.reward_id)
        .bind(record.created_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<RedemptionWithReward>> {
        let rows = sqlx::query(
            r#"
            SELECT h.id, h.reward_id, h.created_at,
                   r.name AS reward_name, r.description AS reward_description
            FROM redemption_histories h
            JOIN rewards r ON r.id = h.reward_id
            WHERE h.user_id = ?
            ORDER BY h.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| RedemptionWithReward {
                id: r.get("id"),
                reward_id: r.get("reward_id"),
                reward_name: r.get("reward_name"),
                reward_description: r.get("reward_description"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn toothbrush(now: DateTime<Utc>) -> Reward {
        Reward {
            id: Uuid::new_v4().to_string(),
            name: "Sikat gigi".to_string(),
            description: "Soft-bristle toothbrush".to_string(),
            point: 100,
            stock: 3,
            is_available: true,
            photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.rewards();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let mut reward = toothbrush(now);
        repo.insert(&reward).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);

        reward.stock = 2;
        reward.is_available = false;
        repo.update(&reward).await.unwrap();
        let found = repo.find(&reward.id).await.unwrap().unwrap();
        assert_eq!(found.stock, 2);
        assert!(!found.is_available);

        assert!(repo.delete(&reward.id).await.unwrap());
        assert!(!repo.delete(&reward.id).await.unwrap());
    }

    #[tokio::test]
    async fn redemption_listing_joins_reward_fields() {
        let db = DbConnection::init_test().await.unwrap();
        let rewards = db.rewards();
        let redemptions = db.redemptions();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let reward = toothbrush(now);
        rewards.insert(&reward).await.unwrap();
        redemptions
            .append(&RedemptionRecord::new("user-1", &reward.id, now))
            .await
            .unwrap();

        let listed = redemptions.list_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].reward_name, "Sikat gigi");

        assert!(redemptions.list_for_user("user-2").await.unwrap().is_empty());
    }
}
