#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::features::territories::services::{CoordinateProjector, GeoDataRepository};

#[cfg(test)]
pub fn embedded_repository() -> Arc<GeoDataRepository> {
    Arc::new(GeoDataRepository::load_embedded().expect("embedded catalogue is valid"))
}

#[cfg(test)]
pub fn embedded_projector(repo: &GeoDataRepository) -> Arc<CoordinateProjector> {
    Arc::new(CoordinateProjector::load_embedded(repo).expect("embedded coordinates are valid"))
}

#[cfg(test)]
#[allow(dead_code)]
pub fn department_json(id: &str, competences: u8) -> String {
    format!(
        r#"{{"id": "{id}", "name": "{id}", "code": "X-{id}", "chefLieu": "Ville", "population": 1000, "budget": 5000000, "competences": {competences}, "status": "operational", "isCapital": false}}"#
    )
}

#[cfg(test)]
#[allow(dead_code)]
pub fn province_json(id: &str, departments: &[String]) -> String {
    format!(
        r##"{{"id": "{id}", "name": "{id}", "code": "P", "capital": "Capitale", "color": "#000000", "departments": [{}]}}"##,
        departments.join(",")
    )
}

#[cfg(test)]
#[allow(dead_code)]
pub fn catalogue_json(provinces: &[String]) -> String {
    format!(r#"{{"provinces": [{}]}}"#, provinces.join(","))
}

#[cfg(test)]
pub use stub_token::StubTokenSource;
