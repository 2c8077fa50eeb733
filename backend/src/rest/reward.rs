//! Reward store endpoints: public catalog and redemption for users, catalog
//! CRUD for admins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use shared::{
    ApiEnvelope, CreateRewardRequest, RedemptionDto, RewardDto, RewardSummaryDto,
    UpdateRewardRequest,
};
use tracing::info;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiResult;

use super::AppState;

pub async fn list_rewards(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /rewards - user: {}", user.id);

    let offset = state.windows.offset();
    let rewards = state.rewards.list().await?;
    let dtos: Vec<RewardDto> = rewards.iter().map(|r| r.to_dto(offset)).collect();
    Ok(Json(ApiEnvelope::ok(dtos)))
}

pub async fn show_reward(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /rewards/{id} - user: {}", user.id);

    let reward = state.rewards.get(&id).await?;
    Ok(Json(ApiEnvelope::ok(reward.to_dto(state.windows.offset()))))
}

pub async fn redeem_reward(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /rewards/{id}/redeem - user: {}", user.id);

    state.rewards.redeem(&user.id, &id).await?;
    Ok(Json(json!({ "message": "OK" })))
}

pub async fn redemption_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /rewards/redemption-history - user: {}", user.id);

    let offset = state.windows.offset();
    let listed = state.rewards.history(&user.id).await?;
    let dtos: Vec<RedemptionDto> = listed
        .into_iter()
        .map(|entry| RedemptionDto {
            id: entry.id,
            reward: RewardSummaryDto {
                id: entry.reward_id,
                name: entry.reward_name,
                description: entry.reward_description,
            },
            created_at: entry.created_at.with_timezone(&offset),
        })
        .collect();
    Ok(Json(ApiEnvelope::ok(dtos)))
}

pub async fn create_reward(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<CreateRewardRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /admin/rewards - admin: {}", admin.0.id);

    let reward = state.rewards.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::created(reward.to_dto(state.windows.offset()))),
    ))
}

pub async fn update_reward(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateRewardRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /admin/rewards/{id} - admin: {}", admin.0.id);

    let reward = state.rewards.update(&id, request).await?;
    Ok(Json(ApiEnvelope::ok(reward.to_dto(state.windows.offset()))))
}

pub async fn delete_reward(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("DELETE /admin/rewards/{id} - admin: {}", admin.0.id);

    state.rewards.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
