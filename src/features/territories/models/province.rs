use serde::{Deserialize, Serialize};

use super::department::DepartmentRecord;

/// Province (first administrative level). Owns an ordered list of departments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capital: String,
    /// Theme tag used by the map views to fill the province
    pub color: String,
    pub departments: Vec<String>,
}

/// Root of the static catalogue file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueFile {
    pub provinces: Vec<ProvinceRecord>,
}

/// Province as written in the catalogue file, departments embedded
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceRecord {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capital: String,
    pub color: String,
    pub departments: Vec<DepartmentRecord>,
}
