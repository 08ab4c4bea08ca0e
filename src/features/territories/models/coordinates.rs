use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Which level of the hierarchy an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Province,
    Department,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Province => write!(f, "province"),
            EntityKind::Department => write!(f, "department"),
        }
    }
}

/// Coordinate space of a rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Fixed-size vector canvas of the polygon map
    Canvas,
    /// Longitude/latitude of the tile map
    Geographic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &CanvasPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for CanvasPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lng) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// `[lng, lat]`, the GeoJSON axis order
impl From<[f64; 2]> for GeoPoint {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// Position of an entity on one surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "surface", rename_all = "lowercase")]
pub enum Position {
    Canvas(CanvasPoint),
    Geographic(GeoPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            min_lng: point.lng,
            min_lat: point.lat,
            max_lng: point.lng,
            max_lat: point.lat,
        }
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.min_lng = self.min_lng.min(point.lng);
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lng = self.max_lng.max(point.lng);
        self.max_lat = self.max_lat.max(point.lat);
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lng: (self.min_lng + self.max_lng) / 2.0,
            lat: (self.min_lat + self.max_lat) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn contains(&self, point: &CanvasPoint) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Root of the coordinate table file
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinateFile {
    pub canvas: CanvasSize,
    pub entries: Vec<CoordinateEntry>,
}

/// One entity's positions on every surface it appears on
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinateEntry {
    pub kind: EntityKind,
    pub id: String,
    #[serde(default)]
    pub canvas: Option<[f64; 2]>,
    #[serde(default)]
    pub geographic: Option<[f64; 2]>,
    /// Province outline ring in canvas space
    #[serde(default)]
    pub outline: Option<Vec<[f64; 2]>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_extend_and_center() {
        let mut bounds = GeoBounds::from_point(GeoPoint::new(9.0, 0.0));
        bounds.extend(GeoPoint::new(11.0, -2.0));
        bounds.extend(GeoPoint::new(10.0, -1.0));

        assert_eq!(bounds.min_lng, 9.0);
        assert_eq!(bounds.max_lat, 0.0);
        assert_eq!(bounds.center(), GeoPoint::new(10.0, -1.0));
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(9.45, 0.39).is_valid());
        assert!(!GeoPoint::new(0.39, 95.0).is_valid());
    }

    #[test]
    fn test_position_serializes_with_surface_tag() {
        let json = serde_json::to_value(Position::Canvas(CanvasPoint::new(1.0, 2.0))).unwrap();
        assert_eq!(json["surface"], "canvas");
        assert_eq!(json["x"], 1.0);
    }
}
