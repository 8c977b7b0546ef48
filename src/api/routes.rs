use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{session::make_span_with_session, session_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Dataset
        .route("/ingredients", get(handlers::get_ingredients))
        .route("/categories", get(handlers::get_categories))
        .route("/overview", get(handlers::get_overview))
        .route("/export", get(handlers::export_dataset))
        .route("/recipes/:title", get(handlers::get_recipe))
        // Filtering
        .route("/filter", post(handlers::filter))
        // Session
        .route("/session", delete(handlers::end_session))
        .route(
            "/session/selection",
            get(handlers::get_selection).put(handlers::update_selection),
        )
        .route("/session/results", get(handlers::get_results))
        .route(
            "/session/favorites",
            get(handlers::get_favorites).post(handlers::add_favorite),
        )
        .route("/session/favorites/:title", delete(handlers::remove_favorite))
        .layer(axum::middleware::from_fn(session_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
