use axum::Router;
use axum::routing::get;

use super::AppState;
use super::handlers::health;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/comments", comments::router(state.clone()))
        .nest("/api/categories", categories::router(state))
        .nest("/api/users", users::router())
}
