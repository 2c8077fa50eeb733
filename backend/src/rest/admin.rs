//! Admin endpoints. The per-user check-in reads delegate to the shared
//! response builders with an explicit user id taken from the path.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::{AdminCheckinRequest, ApiEnvelope, CreateUserRequest};
use tracing::info;

use crate::auth::AdminUser;
use crate::domain::models::{Role, User};
use crate::error::{ApiError, ApiResult};

use super::checkin::{self, DateQuery};
use super::AppState;

pub async fn create_checkin(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<AdminCheckinRequest>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "POST /admin/checkin - admin: {}, user: {}, date: {}",
        admin.0.id, request.user_id, request.date
    );

    let kind = checkin::parse_kind(&request.kind)?;
    let date = checkin::parse_date(&request.date)?;
    if state.users.find(&request.user_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let record = state
        .checkins
        .record_backdated(&request.user_id, kind, date)
        .await?;
    let dto = record.to_dto(state.windows.offset());
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(dto))))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /admin/checkin/leaderboard");
    let board = state.stats.leaderboard().await?;
    Ok(Json(ApiEnvelope::ok(board)))
}

pub async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /admin/users - admin: {}", admin.0.id);

    let role = match request.role.as_deref() {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| ApiError::Validation("ROLE_INVALID"))?,
        None => Role::User,
    };

    let mut user = User::new(&request.name, role, state.clock.now_utc());
    user.birth_date = request.birth_date;
    user.sex = request.sex;
    user.parent_name = request.parent_name;
    user.province_id = request.province_id;
    user.city_id = request.city_id;
    user.district_id = request.district_id;
    user.subdistrict_id = request.subdistrict_id;

    state.users.insert(&user).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "CREATED", "data": user.to_dto() })),
    ))
}

pub async fn user_checkin_history(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /admin/users/{user_id}/checkin/history");
    checkin::history_response(&state, &user_id, query.date.as_deref()).await
}

pub async fn user_checkin_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /admin/users/{user_id}/checkin/status");
    checkin::status_response(&state, &user_id, query.date.as_deref()).await
}

pub async fn user_checkin_consecutive(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    info!("GET /admin/users/{user_id}/checkin/consecutive");
    checkin::consecutive_response(&state, &user_id).await
}

pub async fn user_checkin_summary(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    info!("GET /admin/users/{user_id}/checkin/summary");
    checkin::summary_response(&state, &user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use crate::domain::Clock;
    use crate::test_support::{wib_time, TestBackend};
    use shared::CheckinKind;

    async fn seed_admin(backend: &TestBackend) -> AdminUser {
        let user = User::new("Admin", Role::Admin, backend.clock.now_utc());
        backend.users.insert(&user).await.unwrap();
        AdminUser(AuthUser {
            id: user.id,
            role: user.role,
        })
    }

    async fn seed_member(backend: &TestBackend, name: &str) -> String {
        let user = User::new(name, Role::User, backend.clock.now_utc());
        backend.users.insert(&user).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn backdated_checkin_is_created_for_the_target_user() {
        let backend = TestBackend::at(wib_time(2024, 3, 20, 20, 0)).await;
        let state = backend.state();
        let admin = seed_admin(&backend).await;
        let member = seed_member(&backend, "Andi").await;

        let response = create_checkin(
            State(state.clone()),
            admin.clone(),
            Json(AdminCheckinRequest {
                user_id: member.clone(),
                kind: "morning".to_string(),
                date: "2024-03-10".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(backend
            .checkins
            .has_checked_in(&member, CheckinKind::Morning, date)
            .await
            .unwrap());

        // The same slot again is rejected.
        let err = create_checkin(
            State(state),
            admin,
            Json(AdminCheckinRequest {
                user_id: member,
                kind: "morning".to_string(),
                date: "2024-03-10".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::AlreadyCheckedIn));
    }

    #[tokio::test]
    async fn backdated_checkin_for_unknown_user_is_404() {
        let backend = TestBackend::at(wib_time(2024, 3, 20, 20, 0)).await;
        let state = backend.state();
        let admin = seed_admin(&backend).await;

        let err = create_checkin(
            State(state),
            admin,
            Json(AdminCheckinRequest {
                user_id: "missing".to_string(),
                kind: "morning".to_string(),
                date: "2024-03-10".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn create_user_defaults_to_the_user_role() {
        let backend = TestBackend::at(wib_time(2024, 3, 20, 10, 0)).await;
        let state = backend.state();
        let admin = seed_admin(&backend).await;

        let response = create_user(
            State(state),
            admin,
            Json(CreateUserRequest {
                name: "Sari".to_string(),
                birth_date: None,
                sex: Some("P".to_string()),
                parent_name: Some("Ibu Ratna".to_string()),
                province_id: Some("31".to_string()),
                city_id: None,
                district_id: None,
                subdistrict_id: None,
                role: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
