//! HTTP surface: route table, shared state and the handler modules.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::domain::{
    CheckinService, Clock, RewardService, StatsService, StreakService, TimeWindows,
};
use crate::storage::UserRepository;

pub mod admin;
pub mod checkin;
pub mod reward;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub checkins: CheckinService,
    pub streaks: StreakService,
    pub stats: StatsService,
    pub rewards: RewardService,
    pub users: UserRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub windows: TimeWindows,
    pub clock: Arc<dyn Clock>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/checkin", post(checkin::create_checkin))
        .route("/checkin/history", get(checkin::checkin_history))
        .route("/checkin/point-history", get(checkin::point_history))
        .route("/checkin/statistic", get(checkin::statistic))
        .route("/checkin/status", get(checkin::status))
        .route("/checkin/consecutive", get(checkin::consecutive))
        .route("/checkin/summary", get(checkin::summary))
        .route(
            "/checkin/report/:region_type/:region_id/:year/:month",
            get(checkin::regional_report),
        )
        .route("/admin/checkin", post(admin::create_checkin))
        .route("/admin/checkin/leaderboard", get(admin::leaderboard))
        .route("/admin/users", post(admin::create_user))
        .route(
            "/admin/users/:id/checkin/history",
            get(admin::user_checkin_history),
        )
        .route(
            "/admin/users/:id/checkin/status",
            get(admin::user_checkin_status),
        )
        .route(
            "/admin/users/:id/checkin/consecutive",
            get(admin::user_checkin_consecutive),
        )
        .route(
            "/admin/users/:id/checkin/summary",
            get(admin::user_checkin_summary),
        )
        .route("/rewards", get(reward::list_rewards))
        .route(
            "/rewards/redemption-history",
            get(reward::redemption_history),
        )
        .route("/rewards/:id", get(reward::show_reward))
        .route("/rewards/:id/redeem", post(reward::redeem_reward))
        .route("/admin/rewards", post(reward::create_reward))
        .route(
            "/admin/rewards/:id",
            put(reward::update_reward).delete(reward::delete_reward),
        )
        .with_state(state)
}
