use utoipa::{Modify, OpenApi};

use crate::features::map_token::{dto as map_token_dtos, handler as map_token_handler};
use crate::features::selection::{Hover, Intent, SelectionState};
use crate::features::sessions::{dtos as sessions_dtos, handlers as sessions_handlers};
use crate::features::territories::models::{DepartmentStatus, EntityKind, SpecialZone};
use crate::features::territories::services::{CatalogueStats, ProvinceStats};
use crate::features::territories::{dtos as territories_dtos, handlers as territories_handlers};
use crate::features::views::{Highlight, ViewKind};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Territories
        territories_handlers::list_provinces,
        territories_handlers::get_province,
        territories_handlers::list_departments_by_province,
        territories_handlers::list_departments,
        territories_handlers::get_department,
        territories_handlers::get_stats,
        // Map token
        map_token_handler::issue_token,
        // Sessions
        sessions_handlers::create_session,
        sessions_handlers::get_session,
        sessions_handlers::apply_command,
        sessions_handlers::reload_token,
        sessions_handlers::get_polygon_svg,
        sessions_handlers::delete_session,
    ),
    components(
        schemas(
            Meta,
            // Territories
            EntityKind,
            DepartmentStatus,
            SpecialZone,
            territories_dtos::PositionsDto,
            territories_dtos::ProvinceResponseDto,
            territories_dtos::DepartmentResponseDto,
            territories_dtos::ProvinceDetailDto,
            ProvinceStats,
            CatalogueStats,
            ApiResponse<Vec<territories_dtos::ProvinceResponseDto>>,
            ApiResponse<territories_dtos::ProvinceDetailDto>,
            ApiResponse<Vec<territories_dtos::DepartmentResponseDto>>,
            ApiResponse<territories_dtos::DepartmentResponseDto>,
            ApiResponse<CatalogueStats>,
            // Map token
            map_token_dtos::MapTokenDto,
            map_token_dtos::TokenStatusDto,
            // Selection
            Hover,
            Intent,
            SelectionState,
            // Views
            Highlight,
            ViewKind,
            // Sessions
            sessions_dtos::CreateSessionDto,
            sessions_dtos::TargetDto,
            sessions_dtos::HoverTargetDto,
            sessions_dtos::CanvasClickDto,
            sessions_dtos::MapClickDto,
            sessions_dtos::SearchDto,
            sessions_dtos::SessionCommandDto,
            sessions_dtos::SessionSnapshotDto,
            ApiResponse<sessions_dtos::SessionSnapshotDto>,
        )
    ),
    tags(
        (name = "territories", description = "Provinces and departments of Gabon with their map positions"),
        (name = "map", description = "Access token of the tile map"),
        (name = "sessions", description = "Synchronized polygon map, tile map and list views"),
    ),
    info(
        title = "Territory Portal API",
        version = "0.1.0",
        description = "API documentation for the territory portal",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/provinces",
            "/api/departments/{id}",
            "/api/map/token",
            "/api/sessions",
            "/api/sessions/{id}/intents",
            "/api/sessions/{id}/token/reload",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Portail".to_string(),
            version: "2.0.0".to_string(),
            description: "Territoires".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Portail");
        assert_eq!(doc.info.description.as_deref(), Some("Territoires"));
    }
}
