use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{
    CommentAuthor, CommentThread, CommentView, CreateCommentRequest, UpdateCommentRequest,
};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::MessageResponseDto;
use crate::presentation::handlers::posts::LikeResponseDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
    pub(crate) parent_comment_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentAuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) author: CommentAuthorDto,
    pub(crate) post_id: i64,
    pub(crate) parent_comment_id: Option<i64>,
    pub(crate) like_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A top-level comment carrying its one level of replies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) author: CommentAuthorDto,
    pub(crate) post_id: i64,
    pub(crate) like_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) replies: Vec<CommentDto>,
}

impl From<CommentAuthor> for CommentAuthorDto {
    fn from(author: CommentAuthor) -> Self {
        Self {
            id: author.id,
            username: author.username,
            avatar: author.avatar,
        }
    }
}

impl From<CommentView> for CommentDto {
    fn from(view: CommentView) -> Self {
        let CommentView {
            comment,
            author,
            like_count,
        } = view;
        Self {
            id: comment.id,
            content: comment.content,
            author: author.into(),
            post_id: comment.post_id,
            parent_comment_id: comment.parent_comment_id,
            like_count,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<CommentThread> for CommentThreadDto {
    fn from(thread: CommentThread) -> Self {
        let CommentThread { comment, replies } = thread;
        let top = CommentDto::from(comment);
        Self {
            id: top.id,
            content: top.content,
            author: top.author,
            post_id: top.post_id,
            like_count: top.like_count,
            created_at: top.created_at,
            updated_at: top.updated_at,
            replies: replies.into_iter().map(CommentDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListCommentsResponseDto {
    pub(crate) success: bool,
    pub(crate) comments: Vec<CommentThreadDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentResponseDto {
    pub(crate) success: bool,
    pub(crate) comment: CommentDto,
}

impl From<CommentView> for CommentResponseDto {
    fn from(view: CommentView) -> Self {
        Self {
            success: true,
            comment: view.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comments/post/{postId}",
    tag = "comments",
    params(("postId" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comment threads, newest first", body = ListCommentsResponseDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<ListCommentsResponseDto>)> {
    let threads = state.comment_service.list_for_post(post_id).await?;
    Ok((
        StatusCode::OK,
        Json(ListCommentsResponseDto {
            success: true,
            comments: threads.into_iter().map(CommentThreadDto::from).collect(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/comments/post/{postId}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("postId" = i64, Path, description = "Post id")),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentResponseDto),
        (status = 400, description = "Validation error or invalid parent"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or parent comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentResponseDto>)> {
    dto.validate()?;

    let req = CreateCommentRequest {
        content: dto.content,
        parent_comment_id: dto.parent_comment_id,
    };
    let view = state
        .comment_service
        .create_comment(auth.user_id, post_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentResponseDto>)> {
    dto.validate()?;

    let req = UpdateCommentRequest {
        content: dto.content,
    };
    let view = state
        .comment_service
        .update_comment(&auth.actor(), id, req)
        .await?;

    Ok((StatusCode::OK, Json(view.into())))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment and its replies deleted", body = MessageResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    state
        .comment_service
        .delete_comment(&auth.actor(), id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponseDto::ok("Comment deleted")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/like",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_comment_like(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<LikeResponseDto>)> {
    let outcome = state.comment_service.toggle_like(id, auth.user_id).await?;
    let message = if outcome.has_liked {
        "Comment liked"
    } else {
        "Comment unliked"
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
