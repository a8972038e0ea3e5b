use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::user_service::UserPage;
use crate::domain::user::UserProfile;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::PageQueryDto;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserProfileDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
    pub(crate) bio: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileDto {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            avatar: profile.avatar,
            bio: profile.bio,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersPaginationDto {
    pub(crate) current_page: u32,
    pub(crate) total_pages: i64,
    pub(crate) total_users: i64,
    pub(crate) has_next: bool,
    pub(crate) has_prev: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListUsersResponseDto {
    pub(crate) success: bool,
    pub(crate) users: Vec<UserProfileDto>,
    pub(crate) pagination: UsersPaginationDto,
}

impl From<UserPage> for ListUsersResponseDto {
    fn from(page: UserPage) -> Self {
        let pagination = UsersPaginationDto {
            current_page: page.page,
            total_pages: page.total_pages(),
            total_users: page.total,
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        };
        Self {
            success: true,
            users: page.users.into_iter().map(UserProfileDto::from).collect(),
            pagination,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserProfileResponseDto {
    pub(crate) success: bool,
    pub(crate) user: UserProfileDto,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("page" = Option<u32>, Query, description = "1-indexed page"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)")
    ),
    responses(
        (status = 200, description = "Public profiles, newest first", body = ListUsersResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQueryDto>,
) -> AppResult<(StatusCode, Json<ListUsersResponseDto>)> {
    query.validate()?;
    let page = state.user_service.list_users(query.page, query.limit).await?;
    Ok((StatusCode::OK, Json(page.into())))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = UserProfileResponseDto),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<UserProfileResponseDto>)> {
    let profile = state.user_service.get_profile(id).await?;
    Ok((
        StatusCode::OK,
        Json(UserProfileResponseDto {
            success: true,
            user: profile.into(),
        }),
    ))
}
