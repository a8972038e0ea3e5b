use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::users::{get_user, list_users};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
}
