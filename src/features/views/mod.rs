//! Rendering surfaces of the portal.
//!
//! Three interchangeable adapters render the same `(catalogue, positions,
//! selection)` tuple and emit [`Intent`](crate::features::selection::Intent)s
//! back to the session's controller. None of them holds selection.

pub mod adapter;
pub mod list;
pub mod polygon_map;
pub mod tile_map;

pub use adapter::{Highlight, MapView, RenderContext, ViewAdapter, ViewKind, ViewOutput};
pub use list::ListView;
pub use polygon_map::PolygonMapView;
pub use tile_map::TileMapView;
