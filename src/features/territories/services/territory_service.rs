use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::territories::dtos::{
    DepartmentQuery, DepartmentResponseDto, ProvinceDetailDto, ProvinceResponseDto,
};
use crate::features::territories::services::{
    CatalogueStats, CoordinateProjector, DepartmentEntry, GeoDataRepository,
};
use crate::shared::validation::fold_for_search;

/// Read-only access to the catalogue for the HTTP layer
pub struct TerritoryService {
    repo: Arc<GeoDataRepository>,
    projector: Arc<CoordinateProjector>,
}

impl TerritoryService {
    pub fn new(repo: Arc<GeoDataRepository>, projector: Arc<CoordinateProjector>) -> Self {
        Self { repo, projector }
    }

    // ==================== Province Methods ====================

    pub fn list_provinces(&self) -> Vec<ProvinceResponseDto> {
        self.repo
            .provinces()
            .iter()
            .map(|p| ProvinceResponseDto::new(p, &self.projector))
            .collect()
    }

    pub fn get_province(&self, id: &str) -> Result<ProvinceDetailDto> {
        let province = self.repo.province(id).ok_or_else(|| {
            tracing::warn!("Province lookup for unknown id '{}'", id);
            AppError::NotFound(format!("Province '{}' not found", id))
        })?;
        let departments = self.list_departments_by_province(id)?;

        Ok(ProvinceDetailDto {
            province: ProvinceResponseDto::new(province, &self.projector),
            population: departments.iter().map(|d| d.population).sum(),
            budget: departments.iter().map(|d| d.budget).sum(),
            department_details: departments,
        })
    }

    pub fn list_departments_by_province(&self, id: &str) -> Result<Vec<DepartmentResponseDto>> {
        let entries = self.repo.departments_of(id).ok_or_else(|| {
            tracing::warn!("Department listing for unknown province '{}'", id);
            AppError::NotFound(format!("Province '{}' not found", id))
        })?;
        Ok(self.to_dtos(entries))
    }

    // ==================== Department Methods ====================

    pub fn list_departments(&self, query: &DepartmentQuery) -> Result<Vec<DepartmentResponseDto>> {
        if let Some(province) = query.province.as_deref() {
            if self.repo.province(province).is_none() {
                tracing::warn!("Department filter on unknown province '{}'", province);
                return Err(AppError::NotFound(format!(
                    "Province '{}' not found",
                    province
                )));
            }
        }

        let term = fold_for_search(query.search.as_deref().unwrap_or("").trim());
        let entries = self.repo.all_departments().filter(|entry| {
            query
                .province
                .as_deref()
                .map_or(true, |p| entry.province.id == p)
                && entry.matches(&term)
        });

        Ok(self.to_dtos(entries))
    }

    pub fn get_department(&self, id: &str) -> Result<DepartmentResponseDto> {
        let department = self.repo.department(id);
        let province = self.repo.province_of_department(id);

        match (department, province) {
            (Some(department), Some(province)) => Ok(DepartmentResponseDto::new(
                DepartmentEntry {
                    department,
                    province,
                },
                &self.projector,
            )),
            _ => {
                tracing::warn!("Department lookup for unknown id '{}'", id);
                Err(AppError::NotFound(format!("Department '{}' not found", id)))
            }
        }
    }

    pub fn stats(&self) -> CatalogueStats {
        self.repo.stats()
    }

    fn to_dtos<'a>(
        &self,
        entries: impl IntoIterator<Item = DepartmentEntry<'a>>,
    ) -> Vec<DepartmentResponseDto> {
        entries
            .into_iter()
            .map(|entry| DepartmentResponseDto::new(entry, &self.projector))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{embedded_projector, embedded_repository};

    fn service() -> TerritoryService {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);
        TerritoryService::new(repo, projector)
    }

    #[test]
    fn test_get_province_sums_departments() {
        let detail = service().get_province("estuaire").unwrap();
        assert_eq!(detail.department_details.len(), 4);
        assert_eq!(
            detail.population,
            detail
                .department_details
                .iter()
                .map(|d| d.population)
                .sum::<u64>()
        );
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let service = service();
        assert!(matches!(
            service.get_province("atlantide"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get_department("atlantide-nord"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_departments_combines_province_and_search() {
        let query = DepartmentQuery {
            search: Some("komo".to_string()),
            province: Some("estuaire".to_string()),
        };
        let ids: Vec<String> = service()
            .list_departments(&query)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["komo-mondah", "komo-ocean", "komo"]);
    }

    #[test]
    fn test_department_without_geographic_position_still_listed() {
        let dto = service().get_department("bayi-brikolo").unwrap();
        assert!(dto.positions.geographic.is_none());
        assert!(dto.positions.canvas.is_some());
    }
}
