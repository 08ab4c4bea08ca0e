//! Gabonese administrative territories.
//!
//! Static catalogue of provinces and departments, and the single coordinate
//! table that places them on the polygon map canvas and the tile map.
//!
//! ## Data Hierarchy
//!
//! - Level 1: Provinces - 9 regions
//! - Level 2: Departments - 48 regions, each owned by exactly one province
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/provinces` | List all provinces |
//! | GET | `/api/provinces/{id}` | Province with its departments |
//! | GET | `/api/provinces/{id}/departments` | Departments of a province |
//! | GET | `/api/departments` | List/search departments |
//! | GET | `/api/departments/{id}` | Get department by id |
//! | GET | `/api/stats` | Catalogue totals |

pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{CoordinateProjector, GeoDataRepository, TerritoryService};
