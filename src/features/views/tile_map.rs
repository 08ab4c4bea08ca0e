use serde::Serialize;
use std::f64::consts::PI;

use crate::core::config::MapConfig;
use crate::features::map_token::TokenState;
use crate::features::selection::Intent;
use crate::features::territories::models::{EntityKind, GeoBounds, GeoPoint};
use crate::features::territories::services::{CoordinateProjector, GeoDataRepository};
use crate::features::views::adapter::{Highlight, MapView, RenderContext, ViewKind, ViewOutput};
use crate::shared::constants::DEFAULT_PICK_RADIUS_KM;

const LOADING_MESSAGE: &str = "Chargement de la carte…";
const UNAVAILABLE_MESSAGE: &str = "La carte n'a pas pu être chargée. Réessayez plus tard.";

/// Slippy-map tile index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMarker {
    pub id: String,
    pub name: String,
    pub province_id: String,
    pub position: GeoPoint,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSurface {
    pub tile_url: String,
    pub center: GeoPoint,
    pub zoom: u8,
    pub center_tile: TileCoord,
    /// Bounds of the selected province's departments
    pub fit_bounds: Option<GeoBounds>,
    pub markers: Vec<TileMarker>,
    /// Filtered departments without a geographic position
    pub omitted: Vec<String>,
}

/// Output of the tile map. Each token state has its own presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TileMapOutput {
    /// Token not available yet
    Pending { message: String },
    /// Token request failed; no tiles are drawn
    Unavailable { message: String, reason: String },
    Ready(TileSurface),
}

/// Map surface set up once per token
#[derive(Debug, Clone)]
struct TileSetup {
    token: String,
    tile_url: String,
    center: GeoPoint,
}

/// Tile/marker map gated on the map access token.
///
/// Nothing is initialized until the token is `Ready`; later renders only
/// refresh markers and bounds.
#[derive(Debug)]
pub struct TileMapView {
    tile_url_template: String,
    zoom: u8,
    setup: Option<TileSetup>,
    initializations: u32,
}

impl TileMapView {
    pub fn new(tile_url_template: impl Into<String>, zoom: u8) -> Self {
        Self {
            tile_url_template: tile_url_template.into(),
            zoom,
            setup: None,
            initializations: 0,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.tile_url_template.clone(), config.default_zoom)
    }

    /// Number of times the surface has been set up
    #[cfg(test)]
    pub fn initializations(&self) -> u32 {
        self.initializations
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.setup.is_some()
    }

    /// Whether the surface drawn for `token` is the one set up
    fn is_shown(&self, token: &TokenState) -> bool {
        match (token, self.setup.as_ref()) {
            (TokenState::Ready(token), Some(setup)) => setup.token == *token,
            _ => false,
        }
    }

    /// Intent for a click at `at`: nearest visible marker within the pick radius.
    /// Clicks are ignored unless the surface is shown for the current token.
    pub fn pick(&self, ctx: &RenderContext<'_>, at: GeoPoint) -> Option<Intent> {
        if !self.is_shown(ctx.token) {
            return None;
        }

        let candidates = ctx.departments.iter().map(|e| e.department.id.as_str());
        ctx.projector
            .nearest_geographic(candidates, at, DEFAULT_PICK_RADIUS_KM)
            .map(|id| self.on_select_department(id))
    }

    fn ensure_setup(
        &mut self,
        token: &str,
        repo: &GeoDataRepository,
        projector: &CoordinateProjector,
    ) -> TileSetup {
        if let Some(setup) = self.setup.as_ref().filter(|s| s.token == token) {
            return setup.clone();
        }

        let center = projector
            .geographic_bounds(
                EntityKind::Province,
                repo.provinces().iter().map(|p| p.id.as_str()),
            )
            .map(|bounds| bounds.center())
            .unwrap_or(GeoPoint::new(0.0, 0.0));

        let setup = TileSetup {
            token: token.to_string(),
            tile_url: self
                .tile_url_template
                .replace("{token}", &urlencoding::encode(token)),
            center,
        };
        self.initializations += 1;
        tracing::debug!(
            "Tile map initialized (#{}) centered on {:.2},{:.2}",
            self.initializations,
            center.lng,
            center.lat
        );
        self.setup = Some(setup.clone());
        setup
    }

    fn surface(&self, setup: TileSetup, ctx: &RenderContext<'_>) -> TileSurface {
        let mut markers = Vec::new();
        let mut omitted = Vec::new();
        for entry in ctx.departments {
            let id = entry.department.id.as_str();
            match ctx.projector.geographic(EntityKind::Department, id) {
                Some(position) => markers.push(TileMarker {
                    id: id.to_string(),
                    name: entry.department.name.clone(),
                    province_id: entry.province.id.clone(),
                    position,
                    highlight: ctx.highlight(EntityKind::Department, id),
                }),
                None => omitted.push(id.to_string()),
            }
        }

        let fit_bounds = ctx.state.selected_province_id.as_ref().and_then(|_| {
            ctx.projector.geographic_bounds(
                EntityKind::Department,
                ctx.departments.iter().map(|e| e.department.id.as_str()),
            )
        });

        TileSurface {
            tile_url: setup.tile_url,
            center: setup.center,
            zoom: self.zoom,
            center_tile: lnglat_to_tile(setup.center, self.zoom),
            fit_bounds,
            markers,
            omitted,
        }
    }
}

impl MapView for TileMapView {
    fn kind(&self) -> ViewKind {
        ViewKind::TileMap
    }

    fn render(&mut self, ctx: &RenderContext<'_>) -> ViewOutput {
        let output = match ctx.token {
            TokenState::NotRequested | TokenState::Loading => TileMapOutput::Pending {
                message: LOADING_MESSAGE.to_string(),
            },
            TokenState::Error(reason) => TileMapOutput::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string(),
                reason: reason.clone(),
            },
            TokenState::Ready(token) => {
                let setup = self.ensure_setup(token, ctx.repo, ctx.projector);
                TileMapOutput::Ready(self.surface(setup, ctx))
            }
        };
        ViewOutput::TileMap(output)
    }
}

/// Tile containing a point at zoom `z` (Web Mercator)
pub fn lnglat_to_tile(point: GeoPoint, z: u8) -> TileCoord {
    let n = 2f64.powi(i32::from(z));
    let max = n - 1.0;
    let lat = point.lat.to_radians();

    let x = ((point.lng + 180.0) / 360.0 * n).floor().clamp(0.0, max);
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max);

    TileCoord {
        x: x as u32,
        y: y as u32,
        z,
    }
}
