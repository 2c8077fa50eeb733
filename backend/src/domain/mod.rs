pub mod checkin_service;
pub mod models;
pub mod point_service;
pub mod reward_service;
pub mod settlement;
pub mod stats_service;
pub mod streak_service;
pub mod time_window;

pub use checkin_service::CheckinService;
pub use point_service::PointService;
pub use reward_service::RewardService;
pub use settlement::SettlementService;
pub use stats_service::StatsService;
pub use streak_service::StreakService;
pub use time_window::{Clock, SystemClock, TimeWindows};
