//! SQLite-backed persistence.
//!
//! One `DbConnection` owns the pool and creates the per-collection
//! repositories. The schema is applied idempotently at startup; tests get a
//! unique shared-cache in-memory database each.

use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

pub mod checkin_repository;
pub mod point_repository;
pub mod reward_repository;
pub mod streak_repository;
pub mod token_repository;
pub mod user_repository;

pub use checkin_repository::CheckinRepository;
pub use point_repository::{PointAccountRepository, PointHistoryRepository};
pub use reward_repository::{RedemptionRepository, RewardRepository};
pub use streak_repository::StreakRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;

#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Unique in-memory database, one per test.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);
        Self::new(&url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // One statement per query: the sqlite driver prepares statements
        // individually.
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                birth_date TEXT,
                sex TEXT,
                parent_name TEXT,
                province_id TEXT,
                city_id TEXT,
                district_id TEXT,
                subdistrict_id TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS checkins (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                checkin_at TEXT NOT NULL,
                window_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            // One check-in per user, kind and local window day.
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_checkins_user_kind_day
                ON checkins (user_id, kind, window_date)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS point_accounts (
                user_id TEXT PRIMARY KEY,
                point INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS point_histories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                point INTEGER NOT NULL,
                kind TEXT NOT NULL,
                checkin_at TEXT,
                checkin_kind TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS consecutive_checkins (
                user_id TEXT PRIMARY KEY,
                day INTEGER NOT NULL,
                last_break TEXT,
                consecutive_day_record INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS rewards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                point INTEGER NOT NULL,
                stock INTEGER NOT NULL,
                is_available INTEGER NOT NULL DEFAULT 1,
                photo TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS redemption_histories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                reward_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS auth_tokens (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn checkins(&self) -> CheckinRepository {
        CheckinRepository::new(self.pool.clone())
    }

    pub fn point_accounts(&self) -> PointAccountRepository {
        PointAccountRepository::new(self.pool.clone())
    }

    pub fn point_histories(&self) -> PointHistoryRepository {
        PointHistoryRepository::new(self.pool.clone())
    }

    pub fn streaks(&self) -> StreakRepository {
        StreakRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn rewards(&self) -> RewardRepository {
        RewardRepository::new(self.pool.clone())
    }

    pub fn redemptions(&self) -> RedemptionRepository {
        RedemptionRepository::new(self.pool.clone())
    }

    pub fn tokens(&self) -> TokenRepository {
        TokenRepository::new(self.pool.clone())
    }
}

/// True when the error is the SQLite unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let db = DbConnection::init_test().await.unwrap();
        // Applying the schema a second time must not fail.
        DbConnection::setup_schema(db.pool()).await.unwrap();
    }
}
