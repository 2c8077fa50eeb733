//! Reward catalog and redemption. Redemption is the only consumer of the
//! point account's balance-check/decrement contract outside the check-in
//! flow.

use shared::{CreateRewardRequest, PointEntryKind, UpdateRewardRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::models::{PointHistoryEntry, RedemptionRecord, Reward};
use crate::error::{ApiError, ApiResult};
use crate::storage::{
    reward_repository::RedemptionWithReward, PointHistoryRepository, RedemptionRepository,
    RewardRepository,
};

use super::point_service::PointService;
use super::time_window::Clock;

#[derive(Clone)]
pub struct RewardService {
    rewards: RewardRepository,
    redemptions: RedemptionRepository,
    points: PointService,
    histories: PointHistoryRepository,
    clock: Arc<dyn Clock>,
}

impl RewardService {
    pub fn new(
        rewards: RewardRepository,
        redemptions: RedemptionRepository,
        points: PointService,
        histories: PointHistoryRepository,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rewards,
            redemptions,
            points,
            histories,
            clock,
        }
    }

    /// Full catalog; an empty catalog is NotFound on this endpoint.
    pub async fn list(&self) -> ApiResult<Vec<Reward>> {
        let rewards = self.rewards.list().await?;
        if rewards.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(rewards)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Reward> {
        self.rewards.find(id).await?.ok_or(ApiError::NotFound)
    }

    pub async fn create(&self, request: CreateRewardRequest) -> ApiResult<Reward> {
        let now = self.clock.now_utc();
        let reward = Reward {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            description: request.description,
            point: request.point,
            stock: request.stock,
            is_available: request.is_available,
            photo: request.photo,
            created_at: now,
            updated_at: now,
        };
        self.rewards.insert(&reward).await?;
        Ok(reward)
    }

    /// Partial update: absent fields keep their stored value.
    pub async fn update(&self, id: &str, request: UpdateRewardRequest) -> ApiResult<Reward> {
        let mut reward = self.get(id).await?;

        if let Some(name) = request.name {
            reward.name = name;
        }
        if let Some(description) = request.description {
            reward.description = description;
        }
        if let Some(point) = request.point {
            reward.point = point;
        }
        if let Some(stock) = request.stock {
            reward.stock = stock;
        }
        if let Some(is_available) = request.is_available {
            reward.is_available = is_available;
        }
        if let Some(photo) = request.photo {
            reward.photo = Some(photo);
        }
        reward.updated_at = self.clock.now_utc();

        self.rewards.update(&reward).await?;
        Ok(reward)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        if !self.rewards.delete(id).await? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    /// Exchange points for one unit of a reward. Guards run in the fixed
    /// order the clients rely on: existence, stock, availability, balance.
    pub async fn redeem(&self, user_id: &str, reward_id: &str) -> ApiResult<()> {
        let reward = self.get(reward_id).await?;

        if reward.stock == 0 {
            return Err(ApiError::OutOfStock);
        }
        if !reward.is_available {
            return Err(ApiError::RewardNotAvailable);
        }

        let balance = self.points.balance(user_id).await?;
        if balance < reward.point {
            return Err(ApiError::InsufficientPoint);
        }

        let now = self.clock.now_utc();
        self.rewards
            .set_stock(&reward.id, reward.stock - 1, now)
            .await?;
        self.points.reduce(user_id, reward.point).await?;
        self.histories
            .append(&PointHistoryEntry::new(
                user_id,
                -reward.point,
                PointEntryKind::Redeem,
                None,
                now,
            ))
            .await?;
        self.redemptions
            .append(&RedemptionRecord::new(user_id, &reward.id, now))
            .await?;

        info!(user_id, reward = %reward.name, "reward redeemed");
        Ok(())
    }

    /// The user's redemption log, newest first; empty is NotFound.
    pub async fn history(&self, user_id: &str) -> ApiResult<Vec<RedemptionWithReward>> {
        let listed = self.redemptions.list_for_user(user_id).await?;
        if listed.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(listed)
    }
}
