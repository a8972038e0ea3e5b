use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::services::ServeDir;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, routes};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(settings, state);
    let app = apply_trace(app);
    let app = apply_cors(app, settings)?;
    let app = app.layer(ConcurrencyLimitLayer::new(settings.http_concurrency_limit));

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_router(settings: &Settings, state: AppState) -> Router {
    let uploads = ServeDir::new(state.media.root());

    routes::router(state.clone())
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
        .with_state(state)
}
