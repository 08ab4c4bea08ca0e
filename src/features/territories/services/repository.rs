use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::features::territories::error::CatalogueError;
use crate::features::territories::models::{
    CatalogueFile, Department, DepartmentStatus, EntityKind, Province,
};
use crate::shared::constants::MAX_COMPETENCES;
use crate::shared::validation::{fold_for_search, is_valid_identifier};

const EMBEDDED_CATALOGUE: &str = include_str!("../../../../data/catalogue.json");

/// A department together with its owning province
#[derive(Debug, Clone, Copy)]
pub struct DepartmentEntry<'a> {
    pub department: &'a Department,
    pub province: &'a Province,
}

impl DepartmentEntry<'_> {
    /// Matches a search term already folded with [`fold_for_search`] against
    /// names, codes and chef-lieu of the department and its province.
    pub fn matches(&self, folded_term: &str) -> bool {
        if folded_term.is_empty() {
            return true;
        }
        [
            self.department.name.as_str(),
            self.department.code.as_str(),
            self.department.chef_lieu.as_str(),
            self.province.name.as_str(),
        ]
        .iter()
        .any(|field| fold_for_search(field).contains(folded_term))
    }
}

/// Aggregated figures for one province (stat cards)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceStats {
    pub province_id: String,
    pub departments: usize,
    pub population: u64,
    pub budget: u64,
    pub operational: usize,
    pub average_competences: f64,
}

/// Aggregated figures for the whole catalogue
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueStats {
    pub provinces: usize,
    pub departments: usize,
    pub population: u64,
    pub budget: u64,
    pub operational: usize,
    pub in_transition: usize,
    pub average_competences: f64,
    pub by_province: Vec<ProvinceStats>,
}

/// Immutable catalogue of provinces and departments with O(1) lookups.
///
/// Departments are stored flattened in province order, so iteration order is
/// the catalogue order.
#[derive(Debug)]
pub struct GeoDataRepository {
    provinces: Vec<Province>,
    departments: Vec<Department>,
    /// Index into `provinces` of each department's owner, parallel to `departments`
    owners: Vec<usize>,
    province_index: HashMap<String, usize>,
    department_index: HashMap<String, usize>,
}

impl GeoDataRepository {
    /// Load the catalogue compiled into the binary.
    pub fn load_embedded() -> Result<Self, CatalogueError> {
        Self::from_json(EMBEDDED_CATALOGUE)
    }

    /// Parse and validate a catalogue document.
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogueFile) -> Result<Self, CatalogueError> {
        if file.provinces.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut provinces = Vec::with_capacity(file.provinces.len());
        let mut departments = Vec::new();
        let mut owners = Vec::new();
        let mut province_index = HashMap::new();
        let mut department_index = HashMap::new();

        for record in file.provinces {
            check_identity(EntityKind::Province, &record.id, &record.name)?;
            if province_index.contains_key(&record.id) {
                return Err(CatalogueError::DuplicateProvince(record.id));
            }

            let owner = provinces.len();
            let mut department_ids = Vec::with_capacity(record.departments.len());

            for dept in record.departments {
                check_identity(EntityKind::Department, &dept.id, &dept.name)?;
                if department_index.contains_key(&dept.id) {
                    return Err(CatalogueError::DuplicateDepartment(dept.id));
                }
                if dept.competences > MAX_COMPETENCES {
                    return Err(CatalogueError::CompetencesOutOfRange {
                        id: dept.id,
                        count: dept.competences,
                        max: MAX_COMPETENCES,
                    });
                }

                department_index.insert(dept.id.clone(), departments.len());
                department_ids.push(dept.id.clone());
                departments.push(dept.into_department(&record.id));
                owners.push(owner);
            }

            province_index.insert(record.id.clone(), owner);
            provinces.push(Province {
                id: record.id,
                name: record.name,
                code: record.code,
                capital: record.capital,
                color: record.color,
                departments: department_ids,
            });
        }

        tracing::debug!(
            "Catalogue validated: {} provinces, {} departments",
            provinces.len(),
            departments.len()
        );

        Ok(Self {
            provinces,
            departments,
            owners,
            province_index,
            department_index,
        })
    }

    pub fn province(&self, id: &str) -> Option<&Province> {
        self.province_index.get(id).map(|&idx| &self.provinces[idx])
    }

    pub fn department(&self, id: &str) -> Option<&Department> {
        self.department_index
            .get(id)
            .map(|&idx| &self.departments[idx])
    }

    /// Owning province of a department, through its back-reference
    pub fn province_of_department(&self, department_id: &str) -> Option<&Province> {
        self.department(department_id)
            .and_then(|dept| self.province(&dept.province_id))
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Province => self.province_index.contains_key(id),
            EntityKind::Department => self.department_index.contains_key(id),
        }
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }

    /// Every department with its province, in catalogue order. Calling it again
    /// restarts from the first department.
    pub fn all_departments(&self) -> impl Iterator<Item = DepartmentEntry<'_>> + Clone + '_ {
        self.departments
            .iter()
            .zip(self.owners.iter())
            .map(move |(department, &owner)| DepartmentEntry {
                department,
                province: &self.provinces[owner],
            })
    }

    /// Departments of one province in catalogue order, `None` for an unknown province.
    pub fn departments_of(&self, province_id: &str) -> Option<Vec<DepartmentEntry<'_>>> {
        let province = self.province(province_id)?;
        Some(
            province
                .departments
                .iter()
                .filter_map(|id| self.department(id))
                .map(|department| DepartmentEntry {
                    department,
                    province,
                })
                .collect(),
        )
    }

    /// Case and accent insensitive search over department names, codes and
    /// chef-lieu. An empty term returns every department.
    pub fn search(&self, term: &str) -> Vec<DepartmentEntry<'_>> {
        let folded = fold_for_search(term.trim());
        self.all_departments()
            .filter(|entry| entry.matches(&folded))
            .collect()
    }

    pub fn stats(&self) -> CatalogueStats {
        let by_province: Vec<ProvinceStats> = self
            .provinces
            .iter()
            .map(|province| {
                let members: Vec<&Department> = province
                    .departments
                    .iter()
                    .filter_map(|id| self.department(id))
                    .collect();
                ProvinceStats {
                    province_id: province.id.clone(),
                    departments: members.len(),
                    population: members.iter().map(|d| d.population).sum(),
                    budget: members.iter().map(|d| d.budget).sum(),
                    operational: members
                        .iter()
                        .filter(|d| d.status == DepartmentStatus::Operational)
                        .count(),
                    average_competences: average_competences(members.iter().copied()),
                }
            })
            .collect();

        let operational = by_province.iter().map(|p| p.operational).sum();

        CatalogueStats {
            provinces: self.provinces.len(),
            departments: self.departments.len(),
            population: self.departments.iter().map(|d| d.population).sum(),
            budget: self.departments.iter().map(|d| d.budget).sum(),
            operational,
            in_transition: self.departments.len() - operational,
            average_competences: average_competences(self.departments.iter()),
            by_province,
        }
    }
}

fn check_identity(kind: EntityKind, id: &str, name: &str) -> Result<(), CatalogueError> {
    if !is_valid_identifier(id) {
        return Err(CatalogueError::InvalidIdentifier {
            kind,
            id: id.to_string(),
        });
    }
    if name.trim().is_empty() {
        return Err(CatalogueError::EmptyName {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn average_competences<'a>(departments: impl Iterator<Item = &'a Department>) -> f64 {
    let (count, total) = departments.fold((0usize, 0u64), |(count, total), d| {
        (count + 1, total + d.competences as u64)
    });
    if count == 0 {
        return 0.0;
    }
    // One decimal, as shown on the stat cards
    ((total as f64 / count as f64) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{catalogue_json, department_json, province_json};

    #[test]
    fn test_embedded_catalogue_is_valid() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        assert_eq!(repo.provinces().len(), 9);
        assert_eq!(repo.department_count(), 48);
    }

    #[test]
    fn test_referential_integrity() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        for entry in repo.all_departments() {
            let owner = repo
                .province_of_department(&entry.department.id)
                .expect("every department has an owner");
            assert!(owner.departments.contains(&entry.department.id));
            assert_eq!(owner.id, entry.province.id);
        }
    }

    #[test]
    fn test_estuaire_departments_in_order() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        let ids: Vec<&str> = repo
            .departments_of("estuaire")
            .unwrap()
            .iter()
            .map(|e| e.department.id.as_str())
            .collect();
        assert_eq!(ids, vec!["komo-mondah", "komo-ocean", "komo", "noya"]);
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        assert!(repo.province("atlantide").is_none());
        assert!(repo.department("atlantide-nord").is_none());
        assert!(repo.province_of_department("atlantide-nord").is_none());
        assert!(repo.departments_of("atlantide").is_none());
    }

    #[test]
    fn test_all_departments_is_restartable() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        let first: Vec<&str> = repo
            .all_departments()
            .map(|e| e.department.id.as_str())
            .collect();
        let second: Vec<&str> = repo
            .all_departments()
            .map(|e| e.department.id.as_str())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.first(), Some(&"komo-mondah"));
    }

    #[test]
    fn test_search_ignores_case_and_accents() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        let ids: Vec<&str> = repo
            .search("LOPE")
            .iter()
            .map(|e| e.department.id.as_str())
            .collect();
        assert_eq!(ids, vec!["lope"]);

        // Chef-lieu match
        let ids: Vec<&str> = repo
            .search("franceville")
            .iter()
            .map(|e| e.department.id.as_str())
            .collect();
        assert_eq!(ids, vec!["mpassa"]);

        assert_eq!(repo.search("  ").len(), repo.department_count());
    }

    #[test]
    fn test_stats_add_up() {
        let repo = GeoDataRepository::load_embedded().unwrap();
        let stats = repo.stats();
        assert_eq!(stats.departments, 48);
        assert_eq!(stats.operational + stats.in_transition, 48);
        assert_eq!(
            stats.by_province.iter().map(|p| p.population).sum::<u64>(),
            stats.population
        );
        assert!(stats.average_competences <= MAX_COMPETENCES as f64);
    }

    #[test]
    fn test_duplicate_department_across_provinces_is_fatal() {
        let json = catalogue_json(&[
            province_json("estuaire", &[department_json("komo", 3)]),
            province_json("nyanga", &[department_json("komo", 3)]),
        ]);
        let err = GeoDataRepository::from_json(&json).unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateDepartment(id) if id == "komo"));
    }

    #[test]
    fn test_duplicate_province_is_fatal() {
        let json = catalogue_json(&[
            province_json("estuaire", &[department_json("komo", 3)]),
            province_json("estuaire", &[department_json("noya", 3)]),
        ]);
        let err = GeoDataRepository::from_json(&json).unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateProvince(_)));
    }

    #[test]
    fn test_competences_out_of_range_is_fatal() {
        let json = catalogue_json(&[province_json(
            "estuaire",
            &[department_json("komo", MAX_COMPETENCES + 1)],
        )]);
        let err = GeoDataRepository::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::CompetencesOutOfRange { count: 24, .. }
        ));
    }

    #[test]
    fn test_invalid_identifier_is_fatal() {
        let json = catalogue_json(&[province_json("Estuaire", &[])]);
        let err = GeoDataRepository::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::InvalidIdentifier {
                kind: EntityKind::Province,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_catalogue_is_fatal() {
        let err = GeoDataRepository::from_json(r#"{"provinces": []}"#).unwrap_err();
        assert!(matches!(err, CatalogueError::Empty));
    }
}
