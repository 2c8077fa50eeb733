//! Bounded per-user point balance.
//!
//! The balance is independent of the streak: check-ins add, settlement
//! penalties and redemptions subtract, and the stored value never leaves
//! `[0, 1800]`.

use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;
use crate::storage::PointAccountRepository;

use super::time_window::Clock;

/// Points granted for one successful check-in.
pub const CHECKIN_REWARD: i64 = 5;
/// Points deducted per missed window by the daily settlement.
pub const MISSED_WINDOW_PENALTY: i64 = 10;
/// Balance a brand-new account starts with on its first accrual. The first
/// accrual is always this value, whatever amount was requested.
pub const FIRST_ACCRUAL_SEED: i64 = 5;

pub const MIN_POINT: i64 = 0;
pub const MAX_POINT: i64 = 1800;

#[derive(Clone)]
pub struct PointService {
    accounts: PointAccountRepository,
    clock: Arc<dyn Clock>,
}

impl PointService {
    pub fn new(accounts: PointAccountRepository, clock: Arc<dyn Clock>) -> Self {
        Self { accounts, clock }
    }

    /// Current balance; 0 for users without an account. Reading never
    /// creates the account row.
    pub async fn balance(&self, user_id: &str) -> ApiResult<i64> {
        Ok(self
            .accounts
            .find(user_id)
            .await?
            .map(|account| account.point)
            .unwrap_or(0))
    }

    /// Add `amount` to the balance, clamped to the allowed range. Returns
    /// the new balance.
    pub async fn add(&self, user_id: &str, amount: i64) -> ApiResult<i64> {
        let now = self.clock.now_utc();
        match self.accounts.find(user_id).await? {
            Some(account) => {
                let point = (account.point + amount).clamp(MIN_POINT, MAX_POINT);
                self.accounts.set_point(user_id, point, now).await?;
                Ok(point)
            }
            None => {
                self.accounts
                    .insert(user_id, FIRST_ACCRUAL_SEED, now)
                    .await?;
                info!(user_id, "created point account");
                Ok(FIRST_ACCRUAL_SEED)
            }
        }
    }

    /// Subtract `amount` from the balance, clamped to the allowed range.
    /// Returns the new balance.
    pub async fn reduce(&self, user_id: &str, amount: i64) -> ApiResult<i64> {
        let now = self.clock.now_utc();
        match self.accounts.find(user_id).await? {
            Some(account) => {
                let point = (account.point - amount).clamp(MIN_POINT, MAX_POINT);
                self.accounts.set_point(user_id, point, now).await?;
                Ok(point)
            }
            None => {
                self.accounts.insert(user_id, MIN_POINT, now).await?;
                info!(user_id, "created point account");
                Ok(MIN_POINT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_window::FixedClock;
    use crate::storage::DbConnection;
    use chrono::{TimeZone, Utc};

    async fn service() -> PointService {
        let db = DbConnection::init_test().await.unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap());
        PointService::new(db.point_accounts(), Arc::new(clock))
    }

    #[tokio::test]
    async fn first_accrual_is_always_the_seed() {
        let points = service().await;
        // Whatever amount is requested, a fresh account lands on 5.
        assert_eq!(points.add("user-1", 50).await.unwrap(), 5);
        assert_eq!(points.balance("user-1").await.unwrap(), 5);

        let points = service().await;
        assert_eq!(points.add("user-2", 1).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn balance_reads_never_create_accounts() {
        let points = service().await;
        assert_eq!(points.balance("user-1").await.unwrap(), 0);
        // Still no account: the next add seeds rather than increments.
        assert_eq!(points.add("user-1", 5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reduce_on_missing_account_seeds_zero() {
        let points = service().await;
        assert_eq!(points.reduce("user-1", 10).await.unwrap(), 0);
        assert_eq!(points.balance("user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn balance_stays_within_bounds() {
        let points = service().await;
        points.add("user-1", 5).await.unwrap();

        assert_eq!(points.add("user-1", 5000).await.unwrap(), MAX_POINT);
        assert_eq!(points.add("user-1", 5).await.unwrap(), MAX_POINT);

        assert_eq!(points.reduce("user-1", 10_000).await.unwrap(), MIN_POINT);
        assert_eq!(points.reduce("user-1", 10).await.unwrap(), MIN_POINT);
    }

    #[tokio::test]
    async fn add_and_reduce_move_an_existing_balance() {
        let points = service().await;
        points.add("user-1", 5).await.unwrap(); // seeds at 5
        assert_eq!(points.add("user-1", 5).await.unwrap(), 10);
        assert_eq!(points.reduce("user-1", 10).await.unwrap(), 0);
        assert_eq!(points.add("user-1", 5).await.unwrap(), 5);
    }
}
