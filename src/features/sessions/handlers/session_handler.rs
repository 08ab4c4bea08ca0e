use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::sessions::dtos::{CreateSessionDto, SessionCommandDto, SessionSnapshotDto};
use crate::features::sessions::services::SessionService;
use crate::shared::types::ApiResponse;

/// Open a view session
///
/// `departmentId` or `provinceId` deep-link the initial selection. An
/// unknown identifier leaves the session idle and is reported in `message`.
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionDto,
    responses(
        (status = 201, description = "Session opened", body = ApiResponse<SessionSnapshotDto>),
        (status = 400, description = "Validation error"),
        (status = 503, description = "Session limit reached")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(service): State<Arc<SessionService>>,
    AppJson(dto): AppJson<CreateSessionDto>,
) -> Result<(StatusCode, Json<ApiResponse<SessionSnapshotDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(outcome.snapshot),
            outcome.warning,
            None,
        )),
    ))
}

/// Get the current snapshot of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session snapshot", body = ApiResponse<SessionSnapshotDto>),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    let snapshot = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(snapshot), None, None)))
}

/// Apply a selection intent or a view gesture
///
/// A rejected intent (unknown identifier) is not an error: the snapshot is
/// returned unchanged and the warning is carried in `message`.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/intents",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SessionCommandDto,
    responses(
        (status = 200, description = "Command applied", body = ApiResponse<SessionSnapshotDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn apply_command(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
    AppJson(command): AppJson<SessionCommandDto>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    command
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service.apply(id, command).await?;
    Ok(Json(ApiResponse::success(
        Some(outcome.snapshot),
        outcome.warning,
        None,
    )))
}

/// Retry the map token request after a failure
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/token/reload",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Token request issued or already in flight", body = ApiResponse<SessionSnapshotDto>),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn reload_token(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionSnapshotDto>>> {
    let (snapshot, started) = service.reload_token(id).await?;
    let message = if started {
        "Map token requested"
    } else {
        "Map token request already in progress"
    };
    Ok(Json(ApiResponse::success(
        Some(snapshot),
        Some(message.to_string()),
        None,
    )))
}

/// Render the polygon map of a session as SVG
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/polygon-map.svg",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "SVG document", content_type = "image/svg+xml", body = String),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_polygon_svg(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let svg = service.polygon_svg(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// Close a session
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session closed"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(service): State<Arc<SessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Session closed".to_string()),
        None,
    )))
}
