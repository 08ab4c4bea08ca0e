use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::territories::handlers;
use crate::features::territories::services::TerritoryService;

/// Create routes for the territories feature
pub fn routes(service: Arc<TerritoryService>) -> Router {
    Router::new()
        // Province routes
        .route("/api/provinces", get(handlers::list_provinces))
        .route("/api/provinces/{id}", get(handlers::get_province))
        .route(
            "/api/provinces/{id}/departments",
            get(handlers::list_departments_by_province),
        )
        // Department routes
        .route("/api/departments", get(handlers::list_departments))
        .route("/api/departments/{id}", get(handlers::get_department))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(service)
}
