use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{
    create_comment, delete_comment, list_comments, toggle_comment_like, update_comment,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/post/{postId}", get(list_comments));

    let protected = Router::new()
        .route("/post/{postId}", post(create_comment))
        .route("/{id}", put(update_comment).delete(delete_comment))
        .route("/{id}/like", post(toggle_comment_like))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
