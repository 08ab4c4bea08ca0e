use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::features::territories::models::EntityKind;

/// Entity under the pointer in one of the views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Hover {
    pub kind: EntityKind,
    pub id: String,
}

/// Selection and hover of one view session.
///
/// Only [`SelectionStateController`](super::SelectionStateController) mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_province_id: Option<String>,
    pub selected_department_id: Option<String>,
    pub hovered: Option<Hover>,
}

impl SelectionState {
    pub fn is_hovered(&self, kind: EntityKind, id: &str) -> bool {
        self.hovered
            .as_ref()
            .is_some_and(|h| h.kind == kind && h.id == id)
    }
}

/// Drill-down state derived from a [`SelectionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    Idle,
    ProvinceSelected(&'a str),
    DepartmentSelected { department: &'a str, province: &'a str },
}

impl Phase<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ProvinceSelected(_) => "provinceSelected",
            Phase::DepartmentSelected { .. } => "departmentSelected",
        }
    }
}

/// User intent emitted by a view, applied by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    SelectProvince { id: String },
    SelectDepartment { id: String },
    ClearProvince,
    Back,
    Hover { kind: EntityKind, id: String },
    ClearHover,
}

/// Why an intent was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownProvince(String),
    UnknownDepartment(String),
    UnknownHoverTarget { kind: EntityKind, id: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownProvince(id) => write!(f, "Unknown province '{}'", id),
            Rejection::UnknownDepartment(id) => write!(f, "Unknown department '{}'", id),
            Rejection::UnknownHoverTarget { kind, id } => {
                write!(f, "Unknown {} '{}' cannot be hovered", kind, id)
            }
        }
    }
}

/// Outcome of applying one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
    /// State left untouched; the warning has been logged
    Rejected(Rejection),
}

impl Transition {
    pub fn warning(&self) -> Option<String> {
        match self {
            Transition::Rejected(reason) => Some(reason.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_format() {
        let intent: Intent =
            serde_json::from_str(r#"{"type": "selectDepartment", "id": "komo-ocean"}"#).unwrap();
        assert_eq!(
            intent,
            Intent::SelectDepartment {
                id: "komo-ocean".to_string()
            }
        );

        let intent: Intent =
            serde_json::from_str(r#"{"type": "hover", "kind": "province", "id": "nyanga"}"#)
                .unwrap();
        assert!(matches!(
            intent,
            Intent::Hover {
                kind: EntityKind::Province,
                ..
            }
        ));

        let intent: Intent = serde_json::from_str(r#"{"type": "back"}"#).unwrap();
        assert_eq!(intent, Intent::Back);
    }

    #[test]
    fn test_rejection_warning_message() {
        let transition = Transition::Rejected(Rejection::UnknownDepartment("x".to_string()));
        assert_eq!(
            transition.warning(),
            Some("Unknown department 'x'".to_string())
        );
        assert_eq!(Transition::Unchanged.warning(), None);
    }
}
