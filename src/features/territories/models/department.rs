use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DepartmentStatus {
    Operational,
    Transition,
}

/// Dominant resource or geographic character of a department. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpecialZone {
    Mining,
    Petroleum,
    Coastal,
    Forest,
}

/// Department (second administrative level)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub code: String,
    pub chef_lieu: String,
    pub population: u64,
    /// Budget estimate in FCFA
    pub budget: u64,
    /// Active transferred competences, within `0..=MAX_COMPETENCES`
    pub competences: u8,
    pub status: DepartmentStatus,
    pub special_zone: Option<SpecialZone>,
    pub is_capital: bool,
    pub province_id: String,
}

/// Department as written in the catalogue file (owner implied by nesting)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRecord {
    pub id: String,
    pub name: String,
    pub code: String,
    pub chef_lieu: String,
    pub population: u64,
    pub budget: u64,
    pub competences: u8,
    pub status: DepartmentStatus,
    #[serde(default)]
    pub special_zone: Option<SpecialZone>,
    #[serde(default)]
    pub is_capital: bool,
}

impl DepartmentRecord {
    pub fn into_department(self, province_id: &str) -> Department {
        Department {
            id: self.id,
            name: self.name,
            code: self.code,
            chef_lieu: self.chef_lieu,
            population: self.population,
            budget: self.budget,
            competences: self.competences,
            status: self.status,
            special_zone: self.special_zone,
            is_capital: self.is_capital,
            province_id: province_id.to_string(),
        }
    }
}
