use std::sync::Arc;

use crate::features::selection::models::{
    Hover, Intent, Phase, Rejection, SelectionState, Transition,
};
use crate::features::territories::models::EntityKind;
use crate::features::territories::services::GeoDataRepository;

/// Finite-state machine owning the selection of one view session.
///
/// States are Idle, ProvinceSelected and DepartmentSelected, plus a hover
/// channel that never affects selection. Every method runs to completion
/// synchronously, so a transition is atomic from the point of view of the
/// views.
#[derive(Debug)]
pub struct SelectionStateController {
    repo: Arc<GeoDataRepository>,
    state: SelectionState,
    revision: u64,
}

impl SelectionStateController {
    pub fn new(repo: Arc<GeoDataRepository>) -> Self {
        Self {
            repo,
            state: SelectionState::default(),
            revision: 0,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Incremented on every transition that changed the state
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn phase(&self) -> Phase<'_> {
        match (
            self.state.selected_province_id.as_deref(),
            self.state.selected_department_id.as_deref(),
        ) {
            (Some(province), Some(department)) => Phase::DepartmentSelected {
                department,
                province,
            },
            (Some(province), None) => Phase::ProvinceSelected(province),
            _ => Phase::Idle,
        }
    }

    /// Department identifier handed to an external router, if any
    pub fn navigation_target(&self) -> Option<&str> {
        self.state.selected_department_id.as_deref()
    }

    pub fn dispatch(&mut self, intent: Intent) -> Transition {
        match intent {
            Intent::SelectProvince { id } => self.select_province(&id),
            Intent::SelectDepartment { id } => self.select_department(&id),
            Intent::ClearProvince => self.clear_province(),
            Intent::Back => self.back(),
            Intent::Hover { kind, id } => self.set_hover(kind, &id),
            Intent::ClearHover => self.clear_hover(),
        }
    }

    /// Select a province; any selected department is cleared.
    pub fn select_province(&mut self, id: &str) -> Transition {
        if self.repo.province(id).is_none() {
            return self.reject(Rejection::UnknownProvince(id.to_string()));
        }

        let next = SelectionState {
            selected_province_id: Some(id.to_string()),
            selected_department_id: None,
            hovered: self.state.hovered.clone(),
        };
        self.commit(next)
    }

    /// Select a department. The selected province always follows the
    /// department's owner, replacing a different selected province.
    pub fn select_department(&mut self, id: &str) -> Transition {
        let Some(department) = self.repo.department(id) else {
            return self.reject(Rejection::UnknownDepartment(id.to_string()));
        };

        if let Some(current) = self.state.selected_province_id.as_deref() {
            if current != department.province_id {
                tracing::debug!(
                    "Re-anchoring selected province {} -> {} for department {}",
                    current,
                    department.province_id,
                    id
                );
            }
        }

        let next = SelectionState {
            selected_province_id: Some(department.province_id.clone()),
            selected_department_id: Some(department.id.clone()),
            hovered: self.state.hovered.clone(),
        };
        self.commit(next)
    }

    /// Back to Idle from any selection. Hover is kept.
    pub fn clear_province(&mut self) -> Transition {
        let next = SelectionState {
            selected_province_id: None,
            selected_department_id: None,
            hovered: self.state.hovered.clone(),
        };
        self.commit(next)
    }

    /// One level up: department -> its province -> idle. No-op when idle.
    pub fn back(&mut self) -> Transition {
        let next = match self.phase() {
            Phase::Idle => return Transition::Unchanged,
            Phase::ProvinceSelected(_) => SelectionState {
                selected_province_id: None,
                selected_department_id: None,
                hovered: self.state.hovered.clone(),
            },
            Phase::DepartmentSelected { province, .. } => SelectionState {
                selected_province_id: Some(province.to_string()),
                selected_department_id: None,
                hovered: self.state.hovered.clone(),
            },
        };
        self.commit(next)
    }

    pub fn set_hover(&mut self, kind: EntityKind, id: &str) -> Transition {
        if !self.repo.contains(kind, id) {
            return self.reject(Rejection::UnknownHoverTarget {
                kind,
                id: id.to_string(),
            });
        }

        let mut next = self.state.clone();
        next.hovered = Some(Hover {
            kind,
            id: id.to_string(),
        });
        self.commit(next)
    }

    pub fn clear_hover(&mut self) -> Transition {
        let mut next = self.state.clone();
        next.hovered = None;
        self.commit(next)
    }

    fn commit(&mut self, next: SelectionState) -> Transition {
        if next == self.state {
            return Transition::Unchanged;
        }
        self.state = next;
        self.revision += 1;
        Transition::Changed
    }

    fn reject(&self, reason: Rejection) -> Transition {
        tracing::warn!("Ignoring selection intent: {}", reason);
        Transition::Rejected(reason)
    }
}
