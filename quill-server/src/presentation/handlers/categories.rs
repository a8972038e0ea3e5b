use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::MessageResponseDto;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCategoryDto {
    #[validate(length(min = 1, max = 50))]
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 50))]
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) color: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            color: category.color,
            is_active: category.is_active,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListCategoriesResponseDto {
    pub(crate) success: bool,
    pub(crate) categories: Vec<CategoryDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryResponseDto {
    pub(crate) success: bool,
    pub(crate) category: CategoryDto,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Active categories, name ascending", body = ListCategoriesResponseDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<ListCategoriesResponseDto>)> {
    let categories = state.category_service.list_categories().await?;
    Ok((
        StatusCode::OK,
        Json(ListCategoriesResponseDto {
            success: true,
            categories: categories.into_iter().map(CategoryDto::from).collect(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    Json(dto): Json<CreateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryResponseDto>)> {
    dto.validate()?;

    let req = CreateCategoryRequest {
        name: dto.name,
        description: dto.description,
        color: dto.color,
    };
    let category = state.category_service.create_category(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponseDto {
            success: true,
            category: category.into(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryResponseDto>)> {
    dto.validate()?;

    let req = UpdateCategoryRequest {
        name: dto.name,
        description: dto.description,
        color: dto.color,
    };
    let category = state.category_service.update_category(id, req).await?;

    Ok((
        StatusCode::OK,
        Json(CategoryResponseDto {
            success: true,
            category: category.into(),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deactivated", body = MessageResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    state.category_service.delete_category(id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponseDto::ok("Category deleted")),
    ))
}
