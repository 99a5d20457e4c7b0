use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod company;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

use handlers::general::{health_handler, root_handler};
use openapi::ApiDoc;
use routes::api_routes;
use state::AppState;

/// Full HTTP application: landing page, health, `/api/v1` and Swagger UI at `/docs`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
