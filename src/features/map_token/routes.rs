use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::config::MapConfig;
use crate::features::map_token::handler;

/// Create routes for the map token feature
pub fn routes(config: Arc<MapConfig>) -> Router {
    Router::new()
        .route("/api/map/token", get(handler::issue_token))
        .with_state(config)
}
