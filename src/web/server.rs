use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::geo as geo_handlers;
use super::api::predict as predict_handlers;
use super::api::tracking as tracking_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Tracking session
        .route("/api/tracking", get(tracking_handlers::get_tracking))
        .route(
            "/api/tracking/selection",
            put(tracking_handlers::put_selection),
        )
        .route("/api/tracking/start", post(tracking_handlers::start))
        .route("/api/tracking/stop", post(tracking_handlers::stop))
        .route(
            "/api/tracking/observer",
            put(tracking_handlers::put_observer),
        )
        // Predictions
        .route("/api/satellites", get(predict_handlers::list_satellites))
        .route("/api/passes", get(predict_handlers::list_passes))
        .route(
            "/api/passes/mutual",
            get(predict_handlers::list_mutual_passes),
        )
        // Geometry
        .route("/api/footprint", get(geo_handlers::get_footprint))
        .route("/api/locator/{locator}", get(geo_handlers::get_locator))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
}
