use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::territories::models::{
    DepartmentStatus, EntityKind, Province, SpecialZone,
};
use crate::features::territories::services::{CoordinateProjector, DepartmentEntry};
use crate::shared::validation::validate_identifier;

/// Query parameters for listing departments
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQuery {
    /// Search by name, code or chef-lieu (case and accent insensitive)
    #[param(example = "komo")]
    #[validate(length(max = 100, message = "Search must not exceed 100 characters"))]
    pub search: Option<String>,

    /// Restrict to one province
    #[param(example = "estuaire")]
    #[validate(custom(function = "validate_identifier"))]
    pub province: Option<String>,
}

/// `[lng, lat]` and canvas `[x, y]` positions, when mapped
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic: Option<[f64; 2]>,
}

impl PositionsDto {
    pub fn resolve(projector: &CoordinateProjector, kind: EntityKind, id: &str) -> Self {
        Self {
            canvas: projector.canvas(kind, id).map(|p| [p.x, p.y]),
            geographic: projector.geographic(kind, id).map(|p| [p.lng, p.lat]),
        }
    }
}

/// Response DTO for province data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceResponseDto {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capital: String,
    pub color: String,
    pub departments: Vec<String>,
    pub positions: PositionsDto,
}

impl ProvinceResponseDto {
    pub fn new(province: &Province, projector: &CoordinateProjector) -> Self {
        Self {
            id: province.id.clone(),
            name: province.name.clone(),
            code: province.code.clone(),
            capital: province.capital.clone(),
            color: province.color.clone(),
            departments: province.departments.clone(),
            positions: PositionsDto::resolve(projector, EntityKind::Province, &province.id),
        }
    }
}

/// Response DTO for department data, with its province context
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponseDto {
    pub id: String,
    pub name: String,
    pub code: String,
    pub chef_lieu: String,
    pub population: u64,
    pub budget: u64,
    pub competences: u8,
    pub status: DepartmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_zone: Option<SpecialZone>,
    pub is_capital: bool,
    pub province_id: String,
    pub province_name: String,
    pub positions: PositionsDto,
}

impl DepartmentResponseDto {
    pub fn new(entry: DepartmentEntry<'_>, projector: &CoordinateProjector) -> Self {
        let dept = entry.department;
        Self {
            id: dept.id.clone(),
            name: dept.name.clone(),
            code: dept.code.clone(),
            chef_lieu: dept.chef_lieu.clone(),
            population: dept.population,
            budget: dept.budget,
            competences: dept.competences,
            status: dept.status,
            special_zone: dept.special_zone,
            is_capital: dept.is_capital,
            province_id: entry.province.id.clone(),
            province_name: entry.province.name.clone(),
            positions: PositionsDto::resolve(projector, EntityKind::Department, &dept.id),
        }
    }
}

/// Province with its departments expanded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceDetailDto {
    #[serde(flatten)]
    pub province: ProvinceResponseDto,
    pub department_details: Vec<DepartmentResponseDto>,
    pub population: u64,
    pub budget: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::MAX_SEARCH_LENGTH;

    #[test]
    fn test_search_longer_than_limit_is_rejected() {
        let query = DepartmentQuery {
            search: Some("x".repeat(MAX_SEARCH_LENGTH + 1)),
            province: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_malformed_province_filter_is_rejected() {
        let query = DepartmentQuery {
            search: None,
            province: Some("Haut Ogooué".to_string()),
        };
        assert!(query.validate().is_err());

        let query = DepartmentQuery {
            search: Some("komo".to_string()),
            province: Some("estuaire".to_string()),
        };
        assert!(query.validate().is_ok());
    }
}
