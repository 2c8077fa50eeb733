use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod domain;
mod error;
mod rest;
mod scheduler;
mod storage;
#[cfg(test)]
mod test_support;

use auth::{IdentityProvider, StoreTokenIdentity};
use config::Config;
use domain::{
    CheckinService, Clock, PointService, RewardService, SettlementService, StatsService,
    StreakService, SystemClock, TimeWindows,
};
use rest::AppState;
use storage::DbConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    info!("Setting up database");
    let db = DbConnection::new(&config.database_url).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let windows = TimeWindows::new(config.utc_offset_hours);

    let points = PointService::new(db.point_accounts(), clock.clone());
    let checkins = CheckinService::new(
        db.checkins(),
        db.point_histories(),
        points.clone(),
        windows,
        clock.clone(),
    );
    let streaks = StreakService::new(db.streaks(), clock.clone());
    let stats = StatsService::new(
        checkins.clone(),
        points.clone(),
        streaks.clone(),
        db.users(),
        windows,
        clock.clone(),
    );
    let rewards = RewardService::new(
        db.rewards(),
        db.redemptions(),
        points.clone(),
        db.point_histories(),
        clock.clone(),
    );
    let settlement = SettlementService::new(
        db.users(),
        checkins.clone(),
        points,
        db.point_histories(),
        streaks.clone(),
        windows,
        clock.clone(),
    );

    scheduler::spawn(settlement, windows, clock.clone(), config.settlement_time);

    let identity: Arc<dyn IdentityProvider> = Arc::new(StoreTokenIdentity::new(db.tokens()));
    let state = AppState {
        checkins,
        streaks,
        stats,
        rewards,
        users: db.users(),
        identity,
        windows,
        clock,
    };

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = rest::router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
