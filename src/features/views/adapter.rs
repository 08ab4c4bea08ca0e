use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::map_token::TokenState;
use crate::features::selection::{Intent, SelectionState};
use crate::features::territories::models::EntityKind;
use crate::features::territories::services::{
    CoordinateProjector, DepartmentEntry, GeoDataRepository,
};
use crate::features::views::list::{ListOutput, ListView};
use crate::features::views::polygon_map::{PolygonMapOutput, PolygonMapView};
use crate::features::views::tile_map::{TileMapOutput, TileMapView};

/// Everything a view needs for one render pass, borrowed from the session
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub repo: &'a GeoDataRepository,
    pub projector: &'a CoordinateProjector,
    pub state: &'a SelectionState,
    /// Output of the filter for `state`, in catalogue order
    pub departments: &'a [DepartmentEntry<'a>],
    pub token: &'a TokenState,
    pub search: Option<&'a str>,
}

impl RenderContext<'_> {
    pub fn highlight(&self, kind: EntityKind, id: &str) -> Highlight {
        let selected = match kind {
            EntityKind::Province => self.state.selected_province_id.as_deref(),
            EntityKind::Department => self.state.selected_department_id.as_deref(),
        };

        match selected {
            Some(selected) if selected == id => Highlight::Selected,
            _ if self.state.is_hovered(kind, id) => Highlight::Hovered,
            Some(_) => Highlight::Dimmed,
            None => Highlight::Normal,
        }
    }
}

/// Visual emphasis of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Selected,
    Hovered,
    /// Another entity of the same level is selected
    Dimmed,
    Normal,
}

/// Identifier of a rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    PolygonMap,
    TileMap,
    List,
}

/// Capability shared by every rendering surface.
///
/// Views turn user gestures into intents through the `on_*` builders and
/// never apply them themselves.
pub trait MapView {
    fn kind(&self) -> ViewKind;

    fn render(&mut self, ctx: &RenderContext<'_>) -> ViewOutput;

    fn on_select_province(&self, id: &str) -> Intent {
        Intent::SelectProvince { id: id.to_string() }
    }

    fn on_select_department(&self, id: &str) -> Intent {
        Intent::SelectDepartment { id: id.to_string() }
    }

    fn on_hover(&self, kind: EntityKind, id: &str) -> Intent {
        Intent::Hover {
            kind,
            id: id.to_string(),
        }
    }

    fn on_clear_hover(&self) -> Intent {
        Intent::ClearHover
    }
}

/// Rendered output of one view
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewOutput {
    PolygonMap(PolygonMapOutput),
    TileMap(TileMapOutput),
    List(ListOutput),
}

/// The adapters a session renders
#[derive(Debug)]
pub enum ViewAdapter {
    PolygonMap(PolygonMapView),
    TileMap(TileMapView),
    List(ListView),
}

impl MapView for ViewAdapter {
    fn kind(&self) -> ViewKind {
        match self {
            ViewAdapter::PolygonMap(view) => view.kind(),
            ViewAdapter::TileMap(view) => view.kind(),
            ViewAdapter::List(view) => view.kind(),
        }
    }

    fn render(&mut self, ctx: &RenderContext<'_>) -> ViewOutput {
        match self {
            ViewAdapter::PolygonMap(view) => view.render(ctx),
            ViewAdapter::TileMap(view) => view.render(ctx),
            ViewAdapter::List(view) => view.render(ctx),
        }
    }
}
