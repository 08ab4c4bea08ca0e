use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::config::MapConfig;
use crate::core::error::{AppError, Result};
use crate::features::map_token::dto::MapTokenDto;

/// Issue the access token for the tile surface
///
/// Answers the bare `{ "token": string }` payload consumed by map clients.
#[utoipa::path(
    get,
    path = "/api/map/token",
    responses(
        (status = 200, description = "Map access token", body = MapTokenDto),
        (status = 503, description = "Map token is not configured")
    ),
    tag = "map"
)]
pub async fn issue_token(State(config): State<Arc<MapConfig>>) -> Result<Json<MapTokenDto>> {
    let token = config.access_token.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Map token is not configured".to_string())
    })?;

    Ok(Json(MapTokenDto { token }))
}
