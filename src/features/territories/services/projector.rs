use std::collections::hash_map::Entry;
use std::collections::HashMap;

use geo::{Contains, LineString, Point, Polygon};

use crate::features::territories::error::CatalogueError;
use crate::features::territories::models::{
    CanvasPoint, CanvasSize, CoordinateEntry, CoordinateFile, EntityKind, GeoBounds, GeoPoint,
    Position, SurfaceKind,
};
use crate::features::territories::services::GeoDataRepository;
use crate::shared::constants::EARTH_RADIUS_KM;

const EMBEDDED_COORDINATES: &str = include_str!("../../../../data/coordinates.json");

#[derive(Debug, Default, Clone)]
struct Placement {
    canvas: Option<CanvasPoint>,
    geographic: Option<GeoPoint>,
    outline: Option<Vec<CanvasPoint>>,
    /// Closed polygon of `outline` used for hit-testing
    shape: Option<Polygon<f64>>,
}

/// Single authoritative position table for every rendering surface.
///
/// Keyed by `(kind, id)`; each entry may be placed on any subset of surfaces.
/// An entity missing from a surface is simply not drawn there.
#[derive(Debug)]
pub struct CoordinateProjector {
    canvas_size: CanvasSize,
    provinces: HashMap<String, Placement>,
    departments: HashMap<String, Placement>,
    /// Provinces with an outline, in table order, for deterministic hit-testing
    outline_order: Vec<String>,
}

impl CoordinateProjector {
    pub fn load_embedded(repo: &GeoDataRepository) -> Result<Self, CatalogueError> {
        Self::from_json(EMBEDDED_COORDINATES, repo)
    }

    /// Parse the coordinate table and validate it against the catalogue.
    pub fn from_json(json: &str, repo: &GeoDataRepository) -> Result<Self, CatalogueError> {
        let file: CoordinateFile = serde_json::from_str(json)?;

        let mut projector = Self {
            canvas_size: file.canvas,
            provinces: HashMap::new(),
            departments: HashMap::new(),
            outline_order: Vec::new(),
        };

        for entry in file.entries {
            projector.insert(entry, repo)?;
        }

        Ok(projector)
    }

    fn insert(&mut self, entry: CoordinateEntry, repo: &GeoDataRepository) -> Result<(), CatalogueError> {
        let CoordinateEntry {
            kind,
            id,
            canvas,
            geographic,
            outline,
        } = entry;

        if !repo.contains(kind, &id) {
            return Err(CatalogueError::UnknownEntity { kind, id });
        }

        let canvas = canvas.map(CanvasPoint::from);
        if let Some(point) = canvas {
            if !self.canvas_size.contains(&point) {
                return Err(CatalogueError::InvalidPosition {
                    kind,
                    id,
                    reason: format!("canvas point ({}, {}) outside the canvas", point.x, point.y),
                });
            }
        }

        let geographic = geographic.map(GeoPoint::from);
        if let Some(point) = geographic {
            if !point.is_valid() {
                return Err(CatalogueError::InvalidPosition {
                    kind,
                    id,
                    reason: format!("longitude/latitude ({}, {}) out of range", point.lng, point.lat),
                });
            }
        }

        let outline = match outline {
            None => None,
            Some(_) if kind == EntityKind::Department => {
                return Err(CatalogueError::InvalidOutline {
                    kind,
                    id,
                    reason: "only provinces carry outlines".to_string(),
                });
            }
            Some(ring) if ring.len() < 3 => {
                return Err(CatalogueError::InvalidOutline {
                    kind,
                    id,
                    reason: format!("ring has {} points, at least 3 required", ring.len()),
                });
            }
            Some(ring) => Some(ring.into_iter().map(CanvasPoint::from).collect::<Vec<_>>()),
        };

        let shape = outline.as_deref().map(outline_polygon);
        let has_outline = outline.is_some();
        let table = match kind {
            EntityKind::Province => &mut self.provinces,
            EntityKind::Department => &mut self.departments,
        };

        match table.entry(id) {
            Entry::Occupied(slot) => Err(CatalogueError::DuplicateCoordinates {
                kind,
                id: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                if has_outline {
                    self.outline_order.push(slot.key().clone());
                }
                slot.insert(Placement {
                    canvas,
                    geographic,
                    outline,
                    shape,
                });
                Ok(())
            }
        }
    }

    fn placement(&self, kind: EntityKind, id: &str) -> Option<&Placement> {
        match kind {
            EntityKind::Province => self.provinces.get(id),
            EntityKind::Department => self.departments.get(id),
        }
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    /// Position of an entity on a surface, `None` when it is not mapped there.
    pub fn project(&self, kind: EntityKind, id: &str, surface: SurfaceKind) -> Option<Position> {
        match surface {
            SurfaceKind::Canvas => self.canvas(kind, id).map(Position::Canvas),
            SurfaceKind::Geographic => self.geographic(kind, id).map(Position::Geographic),
        }
    }

    pub fn canvas(&self, kind: EntityKind, id: &str) -> Option<CanvasPoint> {
        self.placement(kind, id).and_then(|p| p.canvas)
    }

    pub fn geographic(&self, kind: EntityKind, id: &str) -> Option<GeoPoint> {
        self.placement(kind, id).and_then(|p| p.geographic)
    }

    pub fn outline(&self, province_id: &str) -> Option<&[CanvasPoint]> {
        self.provinces
            .get(province_id)
            .and_then(|p| p.outline.as_deref())
    }

    /// Catalogue entities lacking a position on `surface`, provinces first.
    pub fn coverage_gaps(
        &self,
        repo: &GeoDataRepository,
        surface: SurfaceKind,
    ) -> Vec<(EntityKind, String)> {
        let provinces = repo
            .provinces()
            .iter()
            .map(|p| (EntityKind::Province, p.id.as_str()));
        let departments = repo
            .all_departments()
            .map(|e| (EntityKind::Department, e.department.id.as_str()));

        provinces
            .chain(departments)
            .filter(|(kind, id)| self.project(*kind, id, surface).is_none())
            .map(|(kind, id)| (kind, id.to_string()))
            .collect()
    }

    /// Province whose outline contains `point`; points on a border belong
    /// to no province.
    pub fn hit_test_canvas(&self, point: CanvasPoint) -> Option<&str> {
        let point = Point::new(point.x, point.y);
        self.outline_order
            .iter()
            .find(|id| {
                self.provinces
                    .get(id.as_str())
                    .and_then(|p| p.shape.as_ref())
                    .is_some_and(|shape| shape.contains(&point))
            })
            .map(String::as_str)
    }

    /// Nearest candidate department to `at` on the geographic surface, within
    /// `radius_km`. Candidates without a geographic position are skipped.
    pub fn nearest_geographic<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a str>,
        at: GeoPoint,
        radius_km: f64,
    ) -> Option<&'a str> {
        candidates
            .into_iter()
            .filter_map(|id| {
                self.geographic(EntityKind::Department, id)
                    .map(|pos| (id, haversine_km(at, pos)))
            })
            .filter(|(_, distance)| *distance <= radius_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Bounding box of the geographic positions of `ids`, `None` if none is placed.
    pub fn geographic_bounds<'a>(
        &self,
        kind: EntityKind,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Option<GeoBounds> {
        ids.into_iter()
            .filter_map(|id| self.geographic(kind, id))
            .fold(None, |bounds: Option<GeoBounds>, point| match bounds {
                None => Some(GeoBounds::from_point(point)),
                Some(mut b) => {
                    b.extend(point);
                    Some(b)
                }
            })
    }
}

/// Great-circle distance in kilometres
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}

fn outline_polygon(ring: &[CanvasPoint]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>().into();
    Polygon::new(exterior, vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{embedded_projector, embedded_repository};

    #[test]
    fn test_embedded_table_resolves_both_surfaces() {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);

        let canvas = projector.project(EntityKind::Department, "komo-ocean", SurfaceKind::Canvas);
        assert!(matches!(canvas, Some(Position::Canvas(_))));

        let geo = projector.project(
            EntityKind::Department,
            "komo-ocean",
            SurfaceKind::Geographic,
        );
        assert_eq!(
            geo,
            Some(Position::Geographic(GeoPoint::new(9.55, -0.33)))
        );
    }

    #[test]
    fn test_missing_positions_are_gaps_not_errors() {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);

        assert!(projector
            .project(EntityKind::Department, "bayi-brikolo", SurfaceKind::Geographic)
            .is_none());
        assert!(projector
            .project(EntityKind::Department, "mongo", SurfaceKind::Canvas)
            .is_none());

        let geo_gaps = projector.coverage_gaps(&repo, SurfaceKind::Geographic);
        assert_eq!(
            geo_gaps,
            vec![(EntityKind::Department, "bayi-brikolo".to_string())]
        );
        let canvas_gaps = projector.coverage_gaps(&repo, SurfaceKind::Canvas);
        assert_eq!(canvas_gaps, vec![(EntityKind::Department, "mongo".to_string())]);
    }

    #[test]
    fn test_unknown_identifier_is_fatal() {
        let repo = embedded_repository();
        let json = r#"{"canvas": {"width": 100, "height": 100},
            "entries": [{"kind": "department", "id": "atlantide", "canvas": [1, 1]}]}"#;
        let err = CoordinateProjector::from_json(json, &repo).unwrap_err();
        assert!(matches!(err, CatalogueError::UnknownEntity { .. }));
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let repo = embedded_repository();
        // "estuaire" is a province, not a department
        let json = r#"{"canvas": {"width": 100, "height": 100},
            "entries": [{"kind": "department", "id": "estuaire", "canvas": [1, 1]}]}"#;
        assert!(CoordinateProjector::from_json(json, &repo).is_err());
    }

    #[test]
    fn test_duplicate_entry_is_fatal() {
        let repo = embedded_repository();
        let json = r#"{"canvas": {"width": 100, "height": 100}, "entries": [
            {"kind": "department", "id": "noya", "canvas": [1, 1]},
            {"kind": "department", "id": "noya", "geographic": [9.6, 1.0]}]}"#;
        let err = CoordinateProjector::from_json(json, &repo).unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateCoordinates { .. }));
    }

    #[test]
    fn test_out_of_canvas_point_is_fatal() {
        let repo = embedded_repository();
        let json = r#"{"canvas": {"width": 100, "height": 100},
            "entries": [{"kind": "department", "id": "noya", "canvas": [150, 1]}]}"#;
        let err = CoordinateProjector::from_json(json, &repo).unwrap_err();
        assert!(matches!(err, CatalogueError::InvalidPosition { .. }));
    }

    #[test]
    fn test_degenerate_outline_is_fatal() {
        let repo = embedded_repository();
        let json = r#"{"canvas": {"width": 100, "height": 100},
            "entries": [{"kind": "province", "id": "estuaire", "outline": [[0, 0], [10, 10]]}]}"#;
        let err = CoordinateProjector::from_json(json, &repo).unwrap_err();
        assert!(matches!(err, CatalogueError::InvalidOutline { .. }));
    }

    #[test]
    fn test_hit_test_finds_province_under_its_anchor() {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);

        let anchor = projector
            .canvas(EntityKind::Province, "haut-ogooue")
            .unwrap();
        assert_eq!(projector.hit_test_canvas(anchor), Some("haut-ogooue"));
        assert_eq!(projector.hit_test_canvas(CanvasPoint::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_outline_polygon_closes_ring() {
        let square = outline_polygon(&[
            CanvasPoint::new(0.0, 0.0),
            CanvasPoint::new(10.0, 0.0),
            CanvasPoint::new(10.0, 10.0),
            CanvasPoint::new(0.0, 10.0),
        ]);
        assert!(square.exterior().is_closed());
        assert!(square.contains(&Point::new(5.0, 5.0)));
        assert!(!square.contains(&Point::new(15.0, 5.0)));
        // Border points are outside
        assert!(!square.contains(&Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_nearest_geographic_respects_radius() {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);
        let ids = ["komo-mondah", "komo-ocean", "komo", "noya"];

        // A few km from Kango
        let near_kango = GeoPoint::new(10.15, 0.15);
        assert_eq!(
            projector.nearest_geographic(ids, near_kango, 15.0),
            Some("komo")
        );

        // Middle of the ocean
        let offshore = GeoPoint::new(7.0, -1.0);
        assert_eq!(projector.nearest_geographic(ids, offshore, 15.0), None);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Libreville to Lambaréné, roughly 150 km
        let libreville = GeoPoint::new(9.45, 0.39);
        let lambarene = GeoPoint::new(10.24, -0.70);
        let distance = haversine_km(libreville, lambarene);
        assert!(distance > 140.0 && distance < 160.0);
        assert!(haversine_km(libreville, libreville) < 0.001);
    }

    #[test]
    fn test_geographic_bounds_of_province_departments() {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);
        let ids = ["komo-mondah", "komo-ocean", "komo", "noya"];

        let bounds = projector
            .geographic_bounds(EntityKind::Department, ids)
            .unwrap();
        assert_eq!(bounds.min_lng, 9.55);
        assert_eq!(bounds.max_lng, 10.12);
        assert_eq!(bounds.min_lat, -0.33);
        assert_eq!(bounds.max_lat, 1.00);

        assert!(projector
            .geographic_bounds(EntityKind::Department, ["bayi-brikolo"])
            .is_none());
    }
}
