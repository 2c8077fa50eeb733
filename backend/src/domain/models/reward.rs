//! Domain models for the reward catalog and redemption log.

use chrono::{DateTime, FixedOffset, Utc};
use shared::RewardDto;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub point: i64,
    pub stock: i64,
    pub is_available: bool,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reward {
    pub fn to_dto(&self, offset: FixedOffset) -> RewardDto {
        RewardDto {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            point: self.point,
            stock: self.stock,
            is_available: self.is_available,
            photo: self.photo.clone(),
            created_at: self.created_at.with_timezone(&offset),
            updated_at: self.updated_at.with_timezone(&offset),
        }
    }
}

/// One (user, reward) redemption event.
#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionRecord {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub created_at: DateTime<Utc>,
}

impl RedemptionRecord {
    pub fn new(user_id: &str, reward_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            reward_id: reward_id.to_string(),
            created_at: now,
        }
    }
}
