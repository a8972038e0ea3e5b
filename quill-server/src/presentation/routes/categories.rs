use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::categories::{
    create_category, delete_category, list_categories, update_category,
};
use crate::presentation::middleware::auth::{admin_only_middleware, jwt_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(list_categories));

    let admin = Router::new()
        .route("/", post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
        .layer(middleware::from_fn(admin_only_middleware))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(admin)
}
