//! Check-in endpoints for the authenticated user, plus the public regional
//! report. The admin per-user variants in `rest::admin` reuse the shared
//! response builders here with an explicit user id.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use shared::{ApiEnvelope, CheckinDto, CheckinKind, CreateCheckinRequest, RegionReportDto};
use tracing::info;

use crate::auth::AuthUser;
use crate::domain::models::RegionType;
use crate::error::{ApiError, ApiResult};

use super::AppState;

#[derive(Deserialize, Debug)]
pub struct DateQuery {
    pub date: Option<String>,
}

pub(super) fn parse_kind(raw: &str) -> ApiResult<CheckinKind> {
    raw.parse()
        .map_err(|_| ApiError::Validation("TYPE_INVALID"))
}

pub(super) fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ApiError::Validation("DATE_INVALID"))
}

/// `YYYY-MM` month filter.
fn parse_year_month(raw: &str) -> ApiResult<(i32, u32)> {
    let date = parse_date(&format!("{raw}-01"))?;
    Ok((date.year(), date.month()))
}

pub async fn create_checkin(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCheckinRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /checkin - user: {}, type: {}", user.id, request.kind);

    let kind = parse_kind(&request.kind)?;
    let record = state.checkins.record(&user.id, kind).await?;
    let dto = record.to_dto(state.windows.offset());
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(dto))))
}

pub async fn checkin_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /checkin/history - user: {}, query: {:?}", user.id, query);
    history_response(&state, &user.id, query.date.as_deref()).await
}

pub(super) async fn history_response(
    state: &AppState,
    user_id: &str,
    date: Option<&str>,
) -> ApiResult<Response> {
    let filter = date.map(parse_year_month).transpose()?;
    let records = state.checkins.history_for_month(user_id, filter).await?;

    let offset = state.windows.offset();
    let dtos: Vec<CheckinDto> = records.iter().map(|r| r.to_dto(offset)).collect();
    Ok(Json(ApiEnvelope::ok(dtos)).into_response())
}

pub async fn point_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    info!("GET /checkin/point-history - user: {}", user.id);

    let entries = state.checkins.point_history(&user.id).await?;
    let offset = state.windows.offset();
    let dtos: Vec<_> = entries.iter().map(|e| e.to_dto(offset)).collect();
    Ok(Json(ApiEnvelope::ok(dtos)))
}

pub async fn statistic(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /checkin/statistic - user: {}, query: {:?}", user.id, query);

    let reference = query.date.as_deref().map(parse_date).transpose()?;
    let week = state.stats.weekly_status(&user.id, reference).await?;
    Ok(Json(ApiEnvelope::ok(week)))
}

pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /checkin/status - user: {}, query: {:?}", user.id, query);
    status_response(&state, &user.id, query.date.as_deref()).await
}

/// Single-day status when a date is given, the whole current month when not.
pub(super) async fn status_response(
    state: &AppState,
    user_id: &str,
    date: Option<&str>,
) -> ApiResult<Response> {
    match date {
        Some(raw) => {
            let day = parse_date(raw)?;
            let status = state.checkins.status_by_date(user_id, day).await?;
            Ok(Json(ApiEnvelope::ok(status)).into_response())
        }
        None => {
            let statuses = state.checkins.status_for_current_month(user_id).await?;
            Ok(Json(ApiEnvelope::ok(statuses)).into_response())
        }
    }
}

pub async fn consecutive(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Response> {
    info!("GET /checkin/consecutive - user: {}", user.id);
    consecutive_response(&state, &user.id).await
}

pub(super) async fn consecutive_response(state: &AppState, user_id: &str) -> ApiResult<Response> {
    let streak = state.streaks.current(user_id).await?;
    Ok(Json(ApiEnvelope::ok(streak.to_dto(state.windows.offset()))).into_response())
}

pub async fn summary(State(state): State<AppState>, user: AuthUser) -> ApiResult<Response> {
    info!("GET /checkin/summary - user: {}", user.id);
    summary_response(&state, &user.id).await
}

pub(super) async fn summary_response(state: &AppState, user_id: &str) -> ApiResult<Response> {
    let summary = state.stats.summary(user_id).await?;
    Ok(Json(ApiEnvelope::ok(summary)).into_response())
}

/// Public endpoint: average completion percentage over a region's users.
pub async fn regional_report(
    State(state): State<AppState>,
    Path((region_type, region_id, year, month)): Path<(String, String, String, String)>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /checkin/report/{region_type}/{region_id}/{year}/{month}");

    let region: RegionType = region_type
        .parse()
        .map_err(|_| ApiError::Validation("REGION_TYPE_INVALID"))?;
    let year: i32 = match year.len() {
        4 => year
            .parse()
            .map_err(|_| ApiError::Validation("YEAR_INVALID"))?,
        _ => return Err(ApiError::Validation("YEAR_INVALID")),
    };
    let month: u32 = month
        .parse()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or(ApiError::Validation("MONTH_INVALID"))?;

    let average = state
        .stats
        .regional_average(region, &region_id, year, month)
        .await?;
    Ok(Json(ApiEnvelope::ok(RegionReportDto {
        average_check_in_percentage: average,
    })))
}
