use std::sync::Arc;

use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::category_service::CategoryService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::user_service::UserService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::media::LocalMediaStore;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) auth_service: Arc<AuthService<PostgresUserRepository>>,
    pub(crate) post_service: Arc<PostService<PostgresPostRepository, PostgresCategoryRepository>>,
    pub(crate) comment_service:
        Arc<CommentService<PostgresCommentRepository, PostgresPostRepository>>,
    pub(crate) category_service: Arc<CategoryService<PostgresCategoryRepository>>,
    pub(crate) user_service: Arc<UserService<PostgresUserRepository>>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) media: Arc<LocalMediaStore>,
}

impl AppState {
    pub(crate) fn build(pool: PgPool, jwt: Arc<JwtService>, media: Arc<LocalMediaStore>) -> Self {
        let users = PostgresUserRepository::new(pool.clone());
        let posts = PostgresPostRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool.clone());
        let categories = PostgresCategoryRepository::new(pool.clone());

        Self {
            pool: pool.clone(),
            auth_service: Arc::new(AuthService::new(users.clone(), (*jwt).clone())),
            post_service: Arc::new(PostService::new(posts.clone(), categories.clone())),
            comment_service: Arc::new(CommentService::new(comments, posts)),
            category_service: Arc::new(CategoryService::new(categories)),
            user_service: Arc::new(UserService::new(users)),
            jwt,
            media,
        }
    }
}
