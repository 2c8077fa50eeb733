use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every error surfaced by the HTTP layer, with its stable wire code as the
/// display string.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("CHECKIN_TIME_NOT_AVAILABLE")]
    CheckinTimeNotAvailable,

    #[error("ALREADY_CHECKED_IN")]
    AlreadyCheckedIn,

    #[error("NOT_FOUND")]
    NotFound,

    #[error("OUT_OF_STOCK")]
    OutOfStock,

    #[error("REWARD_NOT_AVAILABLE")]
    RewardNotAvailable,

    #[error("INSUFFICIENT_POINT")]
    InsufficientPoint,

    #[error("UNAUTHORIZED")]
    Unauthorized,

    #[error("FORBIDDEN")]
    Forbidden,

    /// Request shape violations carry their own code (TYPE_INVALID, ...).
    #[error("{0}")]
    Validation(&'static str),

    #[error("INTERNAL_SERVER_ERROR")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::CheckinTimeNotAvailable
            | ApiError::AlreadyCheckedIn
            | ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::OutOfStock
            | ApiError::RewardNotAvailable
            | ApiError::InsufficientPoint => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(err) => {
                // Full detail stays server-side; the client only sees the code.
                error!("internal error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
