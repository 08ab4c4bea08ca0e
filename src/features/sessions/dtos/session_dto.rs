use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::features::map_token::dto::TokenStatusDto;
use crate::features::selection::{Intent, SelectionState};
use crate::features::territories::models::EntityKind;
use crate::features::views::ViewOutput;
use crate::shared::validation::validate_identifier;

/// Request DTO for opening a view session, optionally deep-linked
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionDto {
    /// Province to select on open
    #[schema(example = "estuaire")]
    #[validate(custom(function = "validate_identifier"))]
    pub province_id: Option<String>,

    /// Department to select on open; wins over `provinceId`
    #[schema(example = "komo-ocean")]
    #[validate(custom(function = "validate_identifier"))]
    pub department_id: Option<String>,

    /// Initial search term of the list view
    #[validate(length(max = 100, message = "Search must not exceed 100 characters"))]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TargetDto {
    #[schema(example = "komo")]
    #[validate(custom(function = "validate_identifier"))]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct HoverTargetDto {
    pub kind: EntityKind,
    #[validate(custom(function = "validate_identifier"))]
    pub id: String,
}

/// Pointer position on the polygon map, in canvas units
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CanvasClickDto {
    #[validate(range(min = 0.0, max = 10000.0))]
    pub x: f64,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub y: f64,
}

/// Click on the tile map
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MapClickDto {
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SearchDto {
    /// `null` or blank clears the search
    #[validate(length(max = 100, message = "Search must not exceed 100 characters"))]
    pub term: Option<String>,
}

/// Command sent by a view: a selection intent or a raw gesture the session
/// resolves to one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionCommandDto {
    SelectProvince(TargetDto),
    SelectDepartment(TargetDto),
    ClearProvince,
    Back,
    Hover(HoverTargetDto),
    ClearHover,
    CanvasClick(CanvasClickDto),
    /// Pointer resting on the polygon map; empty canvas clears the hover
    CanvasHover(CanvasClickDto),
    MapClick(MapClickDto),
    Search(SearchDto),
}

impl Validate for SessionCommandDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            SessionCommandDto::SelectProvince(dto) | SessionCommandDto::SelectDepartment(dto) => {
                dto.validate()
            }
            SessionCommandDto::Hover(dto) => dto.validate(),
            SessionCommandDto::CanvasClick(dto) | SessionCommandDto::CanvasHover(dto) => {
                dto.validate()
            }
            SessionCommandDto::MapClick(dto) => dto.validate(),
            SessionCommandDto::Search(dto) => dto.validate(),
            SessionCommandDto::ClearProvince
            | SessionCommandDto::Back
            | SessionCommandDto::ClearHover => Ok(()),
        }
    }
}

impl SessionCommandDto {
    /// The selection intent carried directly by the command, if any
    pub fn intent(&self) -> Option<Intent> {
        match self {
            SessionCommandDto::SelectProvince(dto) => Some(Intent::SelectProvince {
                id: dto.id.clone(),
            }),
            SessionCommandDto::SelectDepartment(dto) => Some(Intent::SelectDepartment {
                id: dto.id.clone(),
            }),
            SessionCommandDto::ClearProvince => Some(Intent::ClearProvince),
            SessionCommandDto::Back => Some(Intent::Back),
            SessionCommandDto::Hover(dto) => Some(Intent::Hover {
                kind: dto.kind,
                id: dto.id.clone(),
            }),
            SessionCommandDto::ClearHover => Some(Intent::ClearHover),
            SessionCommandDto::CanvasClick(_)
            | SessionCommandDto::CanvasHover(_)
            | SessionCommandDto::MapClick(_)
            | SessionCommandDto::Search(_) => None,
        }
    }
}

/// Everything a client needs to draw the three views of a session
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotDto {
    pub id: Uuid,
    /// Incremented on every effective selection change
    pub revision: u64,
    /// `idle`, `provinceSelected` or `departmentSelected`
    pub phase: String,
    pub state: SelectionState,
    /// Department identifier to hand to a router
    pub navigation_target: Option<String>,
    /// Landing page of `navigationTarget`
    pub navigation_path: Option<String>,
    pub token: TokenStatusDto,
    pub search: Option<String>,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Vec<Object>)]
    pub views: Vec<ViewOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_parses_intents_and_gestures() {
        let command: SessionCommandDto =
            serde_json::from_value(json!({ "type": "selectDepartment", "id": "komo" })).unwrap();
        assert_eq!(
            command.intent(),
            Some(Intent::SelectDepartment {
                id: "komo".to_string()
            })
        );

        let command: SessionCommandDto =
            serde_json::from_value(json!({ "type": "hover", "kind": "province", "id": "nyanga" }))
                .unwrap();
        assert!(matches!(
            command.intent(),
            Some(Intent::Hover {
                kind: EntityKind::Province,
                ..
            })
        ));

        let command: SessionCommandDto =
            serde_json::from_value(json!({ "type": "canvasClick", "x": 10.0, "y": 20.0 })).unwrap();
        assert!(command.intent().is_none());

        let command: SessionCommandDto =
            serde_json::from_value(json!({ "type": "canvasHover", "x": 10.0, "y": 20.0 }))
                .unwrap();
        assert!(command.intent().is_none());

        let command: SessionCommandDto =
            serde_json::from_value(json!({ "type": "back" })).unwrap();
        assert_eq!(command.intent(), Some(Intent::Back));
    }

    #[test]
    fn test_command_validation() {
        let malformed: SessionCommandDto =
            serde_json::from_value(json!({ "type": "selectProvince", "id": "Estuaire Nord" }))
                .unwrap();
        assert!(malformed.validate().is_err());

        // Well-formed but unknown ids are the controller's business
        let unknown: SessionCommandDto =
            serde_json::from_value(json!({ "type": "selectProvince", "id": "atlantide" }))
                .unwrap();
        assert!(unknown.validate().is_ok());

        let off_globe: SessionCommandDto =
            serde_json::from_value(json!({ "type": "mapClick", "lng": 200.0, "lat": 0.0 }))
                .unwrap();
        assert!(off_globe.validate().is_err());

        let long_search: SessionCommandDto =
            serde_json::from_value(json!({ "type": "search", "term": "x".repeat(101) })).unwrap();
        assert!(long_search.validate().is_err());
    }

    #[test]
    fn test_create_session_validation() {
        let dto = CreateSessionDto {
            department_id: Some("komo-ocean".to_string()),
            ..CreateSessionDto::default()
        };
        assert!(dto.validate().is_ok());

        let dto = CreateSessionDto {
            province_id: Some("-estuaire".to_string()),
            ..CreateSessionDto::default()
        };
        assert!(dto.validate().is_err());
    }
}
