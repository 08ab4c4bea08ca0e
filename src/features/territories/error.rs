use thiserror::Error;

use crate::features::territories::models::EntityKind;

/// Data-integrity violations in the static catalogue or the coordinate table.
///
/// All of them are fatal configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to parse catalogue data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalogue contains no provinces")]
    Empty,

    #[error("Invalid {kind} identifier '{id}'")]
    InvalidIdentifier { kind: EntityKind, id: String },

    #[error("Duplicate province identifier '{0}'")]
    DuplicateProvince(String),

    #[error("Duplicate department identifier '{0}'")]
    DuplicateDepartment(String),

    #[error("{kind} '{id}' has an empty name")]
    EmptyName { kind: EntityKind, id: String },

    #[error("Department '{id}' declares {count} competences (maximum {max})")]
    CompetencesOutOfRange { id: String, count: u8, max: u8 },

    #[error("Coordinates reference unknown {kind} '{id}'")]
    UnknownEntity { kind: EntityKind, id: String },

    #[error("Duplicate coordinates for {kind} '{id}'")]
    DuplicateCoordinates { kind: EntityKind, id: String },

    #[error("Invalid position for {kind} '{id}': {reason}")]
    InvalidPosition {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    #[error("Invalid outline for {kind} '{id}': {reason}")]
    InvalidOutline {
        kind: EntityKind,
        id: String,
        reason: String,
    },
}
