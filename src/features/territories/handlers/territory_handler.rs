use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::territories::dtos::{
    DepartmentQuery, DepartmentResponseDto, ProvinceDetailDto, ProvinceResponseDto,
};
use crate::features::territories::services::{CatalogueStats, TerritoryService};
use crate::shared::types::{ApiResponse, Meta};

// ==================== Province Handlers ====================

/// List all provinces
#[utoipa::path(
    get,
    path = "/api/provinces",
    responses(
        (status = 200, description = "List of provinces", body = ApiResponse<Vec<ProvinceResponseDto>>)
    ),
    tag = "territories"
)]
pub async fn list_provinces(
    State(service): State<Arc<TerritoryService>>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    let provinces = service.list_provinces();
    let meta = Meta::total(provinces.len());
    Ok(Json(ApiResponse::success(Some(provinces), None, Some(meta))))
}

/// Get a province with its departments
#[utoipa::path(
    get,
    path = "/api/provinces/{id}",
    params(
        ("id" = String, Path, description = "Province identifier")
    ),
    responses(
        (status = 200, description = "Province details", body = ApiResponse<ProvinceDetailDto>),
        (status = 404, description = "Province not found")
    ),
    tag = "territories"
)]
pub async fn get_province(
    State(service): State<Arc<TerritoryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProvinceDetailDto>>> {
    let province = service.get_province(&id)?;
    Ok(Json(ApiResponse::success(Some(province), None, None)))
}

/// List departments of a province, in catalogue order
#[utoipa::path(
    get,
    path = "/api/provinces/{id}/departments",
    params(
        ("id" = String, Path, description = "Province identifier")
    ),
    responses(
        (status = 200, description = "Departments of the province", body = ApiResponse<Vec<DepartmentResponseDto>>),
        (status = 404, description = "Province not found")
    ),
    tag = "territories"
)]
pub async fn list_departments_by_province(
    State(service): State<Arc<TerritoryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DepartmentResponseDto>>>> {
    let departments = service.list_departments_by_province(&id)?;
    let meta = Meta::total(departments.len());
    Ok(Json(ApiResponse::success(Some(departments), None, Some(meta))))
}

// ==================== Department Handlers ====================

/// List departments, optionally filtered by province and search term
#[utoipa::path(
    get,
    path = "/api/departments",
    params(DepartmentQuery),
    responses(
        (status = 200, description = "List of departments", body = ApiResponse<Vec<DepartmentResponseDto>>),
        (status = 400, description = "Invalid query"),
        (status = 404, description = "Province not found")
    ),
    tag = "territories"
)]
pub async fn list_departments(
    State(service): State<Arc<TerritoryService>>,
    Query(query): Query<DepartmentQuery>,
) -> Result<Json<ApiResponse<Vec<DepartmentResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let departments = service.list_departments(&query)?;
    let meta = Meta::total(departments.len());
    Ok(Json(ApiResponse::success(Some(departments), None, Some(meta))))
}

/// Get a department by identifier
#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(
        ("id" = String, Path, description = "Department identifier")
    ),
    responses(
        (status = 200, description = "Department details", body = ApiResponse<DepartmentResponseDto>),
        (status = 404, description = "Department not found")
    ),
    tag = "territories"
)]
pub async fn get_department(
    State(service): State<Arc<TerritoryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DepartmentResponseDto>>> {
    let department = service.get_department(&id)?;
    Ok(Json(ApiResponse::success(Some(department), None, None)))
}

/// Catalogue totals for the stat cards
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Catalogue statistics", body = ApiResponse<CatalogueStats>)
    ),
    tag = "territories"
)]
pub async fn get_stats(
    State(service): State<Arc<TerritoryService>>,
) -> Result<Json<ApiResponse<CatalogueStats>>> {
    Ok(Json(ApiResponse::success(Some(service.stats()), None, None)))
}
