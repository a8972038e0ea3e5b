use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::app_error::{ErrorBody, FieldErrorDto};
use crate::presentation::handlers::MessageResponseDto;
use crate::presentation::handlers::auth::{
    AuthResponseDto, LoginDto, ProfileUpdateDto, RegisterDto, UserDto, UserResponseDto,
};
use crate::presentation::handlers::categories::{
    CategoryDto, CategoryResponseDto, CreateCategoryDto, ListCategoriesResponseDto,
    UpdateCategoryDto,
};
use crate::presentation::handlers::comments::{
    CommentAuthorDto, CommentDto, CommentResponseDto, CommentThreadDto, CreateCommentDto,
    ListCommentsResponseDto, UpdateCommentDto,
};
use crate::presentation::handlers::posts::{
    CategoryRefDto, LikeResponseDto, ListPostsQueryDto, ListPostsResponseDto, PageQueryDto,
    PaginationDto, PostAuthorDto, PostDto, PostFormDto, PostResponseDto,
};
use crate::presentation::handlers::users::{
    ListUsersResponseDto, UserProfileDto, UserProfileResponseDto, UsersPaginationDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::health,
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::me,
        crate::presentation::handlers::auth::update_profile,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::toggle_post_like,
        crate::presentation::handlers::posts::list_user_posts,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::comments::toggle_comment_like,
        crate::presentation::handlers::categories::list_categories,
        crate::presentation::handlers::categories::create_category,
        crate::presentation::handlers::categories::update_category,
        crate::presentation::handlers::categories::delete_category,
        crate::presentation::handlers::users::list_users,
        crate::presentation::handlers::users::get_user
    ),
    components(
        schemas(
            ErrorBody,
            FieldErrorDto,
            MessageResponseDto,
            RegisterDto,
            LoginDto,
            ProfileUpdateDto,
            UserDto,
            AuthResponseDto,
            UserResponseDto,
            ListPostsQueryDto,
            PageQueryDto,
            PostFormDto,
            PostAuthorDto,
            CategoryRefDto,
            PostDto,
            PaginationDto,
            ListPostsResponseDto,
            PostResponseDto,
            LikeResponseDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentAuthorDto,
            CommentDto,
            CommentThreadDto,
            ListCommentsResponseDto,
            CommentResponseDto,
            CreateCategoryDto,
            UpdateCategoryDto,
            CategoryDto,
            ListCategoriesResponseDto,
            CategoryResponseDto,
            UserProfileDto,
            UsersPaginationDto,
            ListUsersResponseDto,
            UserProfileResponseDto
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration, login and the caller's profile"),
        (name = "posts", description = "Posts, likes and per-author listings"),
        (name = "comments", description = "Comment threads and likes"),
        (name = "categories", description = "Category management"),
        (name = "users", description = "Public user profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
