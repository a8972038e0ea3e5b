use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;
use super::app_error::AppResult;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod users;

/// Standard `{success, message}` body for mutations without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageResponseDto {
    pub(crate) success: bool,
    pub(crate) message: String,
}

impl MessageResponseDto {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database reachable", body = MessageResponseDto),
        (status = 500, description = "Database unreachable")
    )
)]
pub(crate) async fn health(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(anyhow::Error::from)?;
    Ok((StatusCode::OK, Json(MessageResponseDto::ok("ok"))))
}
