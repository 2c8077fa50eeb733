use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Opaque bearer tokens mapped to user ids. Issuance belongs to the external
/// identity provider; this table is only the verification side.
#[derive(Clone)]
pub struct TokenRepository {
    pool: Arc<SqlitePool>,
}

impl TokenRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, token: &str, user_id: &str, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(now)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_user_id(&self, token: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT user_id FROM auth_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(|r| r.get("user_id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use chrono::TimeZone;

    #[tokio::test]
    async fn resolves_only_known_tokens() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.tokens();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        repo.insert("tok-abc", "user-1", now).await.unwrap();
        assert_eq!(
            repo.find_user_id("tok-abc").await.unwrap(),
            Some("user-1".to_string())
        );
        assert!(repo.find_user_id("tok-unknown").await.unwrap().is_none());
    }
}
