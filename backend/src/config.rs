use std::{env, fmt::Display, str::FromStr};

use chrono::NaiveTime;
use tracing::{info, warn};

/// Runtime configuration, loaded from the environment with logged defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Fixed application UTC offset in whole hours (WIB is +7).
    pub utc_offset_hours: i32,
    /// Local wall-clock time the daily settlement runs at.
    pub settlement_time: NaiveTime,
    pub cors_origin: String,
}

impl Config {
    pub fn load() -> Self {
        let settlement_raw: String = try_load("SETTLEMENT_TIME", "23:30");
        let settlement_time = NaiveTime::parse_from_str(&settlement_raw, "%H:%M")
            .map_err(|e| {
                warn!("Invalid SETTLEMENT_TIME value {settlement_raw}: {e}");
            })
            .expect("Environment misconfigured!");

        let utc_offset_hours: i32 = try_load("APP_UTC_OFFSET_HOURS", "7");
        if !(-12..=14).contains(&utc_offset_hours) {
            panic!("APP_UTC_OFFSET_HOURS out of range: {utc_offset_hours}");
        }

        Self {
            port: try_load("PORT", "3000"),
            database_url: try_load("DATABASE_URL", "sqlite:dental-tracker.db"),
            utc_offset_hours,
            settlement_time,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:8080"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
