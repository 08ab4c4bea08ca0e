/// Number of governmental competences that can be transferred to a department
pub const MAX_COMPETENCES: u8 = 23;

/// Longest identifier accepted in the catalogue and in request payloads
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Longest free-text search term accepted by the list view
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Radius (canvas units) around a department marker that counts as a click on it
pub const CANVAS_MARKER_HIT_RADIUS: f64 = 8.0;

/// Radius around a click on the tile map within which the nearest marker is picked
pub const DEFAULT_PICK_RADIUS_KM: f64 = 15.0;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Title of the list view when no province is selected
pub const ALL_DEPARTMENTS_TITLE: &str = "Tous les départements";
