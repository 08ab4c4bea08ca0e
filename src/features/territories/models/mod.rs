mod coordinates;
mod department;
mod province;

pub use coordinates::{
    CanvasPoint, CanvasSize, CoordinateEntry, CoordinateFile, EntityKind, GeoBounds, GeoPoint,
    Position, SurfaceKind,
};
pub use department::{Department, DepartmentStatus, SpecialZone};
pub use province::{CatalogueFile, Province};
