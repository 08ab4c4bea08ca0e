mod projector;
mod repository;
mod territory_service;

pub use projector::CoordinateProjector;
pub use repository::{CatalogueStats, DepartmentEntry, GeoDataRepository, ProvinceStats};
pub use territory_service::TerritoryService;
