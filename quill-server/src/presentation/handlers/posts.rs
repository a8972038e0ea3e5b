use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::{ListPostsQuery, PostPage};
use crate::domain::post::{
    CategoryRef, CreatePostRequest, PostAuthor, PostView, UpdatePostRequest,
};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::handlers::MessageResponseDto;
use crate::presentation::middleware::auth::{AuthenticatedUser, OptionalUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ListPostsQueryDto {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) author: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PageQueryDto {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
}

/// Documents the multipart form consumed by create/update; the actual
/// parsing is manual because the image arrives alongside the text fields.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostFormDto {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    /// Comma-separated category ids, e.g. `1,4`.
    pub(crate) categories: Option<String>,
    /// Comma-separated tags, e.g. `rust,async`.
    pub(crate) tags: Option<String>,
    pub(crate) is_published: Option<bool>,
    /// Image file; jpg/jpeg/png/gif/webp.
    #[schema(value_type = Option<String>, format = Binary)]
    pub(crate) featured_image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostAuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) color: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: String,
    pub(crate) author: PostAuthorDto,
    pub(crate) categories: Vec<CategoryRefDto>,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) slug: String,
    pub(crate) view_count: i64,
    pub(crate) comment_count: i64,
    pub(crate) like_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<PostView> for PostDto {
    fn from(view: PostView) -> Self {
        let PostView {
            post,
            author,
            categories,
            comment_count,
            like_count,
        } = view;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            author: author.into(),
            categories: categories.into_iter().map(CategoryRefDto::from).collect(),
            tags: post.tags,
            is_published: post.is_published,
            published_at: post.published_at,
            slug: post.slug,
            view_count: post.view_count,
            comment_count,
            like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostAuthor> for PostAuthorDto {
    fn from(author: PostAuthor) -> Self {
        Self {
            id: author.id,
            username: author.username,
            avatar: author.avatar,
        }
    }
}

impl From<CategoryRef> for CategoryRefDto {
    fn from(category: CategoryRef) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color: category.color,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationDto {
    pub(crate) current_page: u32,
    pub(crate) total_pages: i64,
    pub(crate) total_posts: i64,
    pub(crate) has_next: bool,
    pub(crate) has_prev: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) success: bool,
    pub(crate) posts: Vec<PostDto>,
    pub(crate) pagination: PaginationDto,
}

impl From<PostPage> for ListPostsResponseDto {
    fn from(page: PostPage) -> Self {
        let pagination = PaginationDto {
            current_page: page.page,
            total_pages: page.total_pages(),
            total_posts: page.total,
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        };
        Self {
            success: true,
            posts: page.posts.into_iter().map(PostDto::from).collect(),
            pagination,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostResponseDto {
    pub(crate) success: bool,
    pub(crate) post: PostDto,
}

impl From<PostView> for PostResponseDto {
    fn from(view: PostView) -> Self {
        Self {
            success: true,
            post: view.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeResponseDto {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) like_count: i64,
    pub(crate) has_liked: bool,
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "1-indexed page"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)"),
        ("category" = Option<String>, Query, description = "Category name, case-insensitive"),
        ("search" = Option<String>, Query, description = "Substring over title or content"),
        ("author" = Option<i64>, Query, description = "Author id")
    ),
    responses(
        (status = 200, description = "Published posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQueryDto>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;

    let page = state
        .post_service
        .list_posts(ListPostsQuery {
            page: query.page,
            limit: query.limit,
            category: query.category,
            search: query.search,
            author_id: query.author,
        })
        .await?;

    Ok((StatusCode::OK, Json(page.into())))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = PostResponseDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    let view = state.post_service.get_post(id).await?;
    Ok((StatusCode::OK, Json(view.into())))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(("bearer_auth" = [])),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    let form = PostForm::read(multipart).await?;

    let title = form
        .title
        .ok_or_else(|| AppError::BadRequest("title is required".to_string()))?;
    let content = form
        .content
        .ok_or_else(|| AppError::BadRequest("content is required".to_string()))?;

    let featured_image = match form.image {
        Some((name, data)) => Some(state.media.save(&name, &data).await?),
        None => None,
    };

    let req = CreatePostRequest {
        title,
        content,
        excerpt: form.excerpt,
        category_ids: form.category_ids.unwrap_or_default(),
        tags: form.tags.unwrap_or_default(),
        is_published: form.is_published.unwrap_or(true),
        featured_image,
    };
    let view = state.post_service.create_post(auth.user_id, req).await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = PostResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    let form = PostForm::read(multipart).await?;

    let featured_image = match form.image {
        Some((name, data)) => Some(state.media.save(&name, &data).await?),
        None => None,
    };

    let req = UpdatePostRequest {
        title: form.title,
        content: form.content,
        excerpt: form.excerpt,
        category_ids: form.category_ids,
        tags: form.tags,
        is_published: form.is_published,
        featured_image,
    };
    let view = state
        .post_service
        .update_post(&auth.actor(), id, req)
        .await?;

    Ok((StatusCode::OK, Json(view.into())))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    state.post_service.delete_post(&auth.actor(), id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponseDto::ok("Post deleted")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_post_like(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<LikeResponseDto>)> {
    let outcome = state.post_service.toggle_like(id, auth.user_id).await?;
    let message = if outcome.has_liked {
        "Post liked"
    } else {
        "Post unliked"
    };

    Ok((
        StatusCode::OK,
        Json(LikeResponseDto {
            success: true,
            message: message.to_string(),
            like_count: outcome.like_count,
            has_liked: outcome.has_liked,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{userId}",
    tag = "posts",
    params(
        ("userId" = i64, Path, description = "Author id"),
        ("page" = Option<u32>, Query, description = "1-indexed page"),
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)")
    ),
    responses(
        (status = 200, description = "Author's posts; drafts only for the author themself", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQueryDto>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;

    let viewer = viewer.map(|user| user.actor());
    let page = state
        .post_service
        .list_user_posts(user_id, viewer.as_ref(), query.page, query.limit)
        .await?;

    Ok((StatusCode::OK, Json(page.into())))
}

struct PostForm {
    title: Option<String>,
    content: Option<String>,
    excerpt: Option<String>,
    category_ids: Option<Vec<i64>>,
    tags: Option<Vec<String>>,
    is_published: Option<bool>,
    image: Option<(String, Vec<u8>)>,
}

impl PostForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self {
            title: None,
            content: None,
            excerpt: None,
            category_ids: None,
            tags: None,
            is_published: None,
            image: None,
        };

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "featuredImage" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty file part when nothing was picked.
                if !data.is_empty() {
                    form.image = Some((file_name, data.to_vec()));
                }
                continue;
            }

            let text = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "title" => form.title = Some(text),
                "content" => form.content = Some(text),
                "excerpt" => form.excerpt = Some(text),
                "categories" => form.category_ids = Some(parse_id_list(&text)?),
                "tags" => form.tags = Some(parse_tag_list(&text)),
                "isPublished" => form.is_published = Some(parse_bool(&name, &text)?),
                _ => {}
            }
        }

        Ok(form)
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid multipart body: {err}"))
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("invalid category id: {part}")))
        })
        .collect()
}

fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "{field} must be true or false"
        ))),
    }
}
