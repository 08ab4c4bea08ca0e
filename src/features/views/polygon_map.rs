use serde::Serialize;

use crate::features::selection::Intent;
use crate::features::territories::models::{CanvasPoint, EntityKind};
use crate::features::views::adapter::{Highlight, MapView, RenderContext, ViewKind, ViewOutput};
use crate::shared::constants::CANVAS_MARKER_HIT_RADIUS;
use crate::shared::templates::{render_template, TemplateError};

const SVG_TEMPLATE: &str = "views/polygon_map.svg.jinja";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceShape {
    pub id: String,
    pub name: String,
    pub color: String,
    /// SVG path data of the outline
    pub path: String,
    pub label: Option<CanvasPoint>,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMarker {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonMapOutput {
    pub width: f64,
    pub height: f64,
    pub provinces: Vec<ProvinceShape>,
    /// Departments of the selected province placed on the canvas
    pub markers: Vec<DepartmentMarker>,
    /// Departments of the selected province without a canvas position
    pub omitted: Vec<String>,
}

/// Fixed-size vector map: province outlines, plus department markers once a
/// province is selected.
#[derive(Debug, Default)]
pub struct PolygonMapView;

impl PolygonMapView {
    pub fn build(&self, ctx: &RenderContext<'_>) -> PolygonMapOutput {
        let size = ctx.projector.canvas_size();

        let provinces = ctx
            .repo
            .provinces()
            .iter()
            .filter_map(|province| {
                let outline = ctx.projector.outline(&province.id)?;
                Some(ProvinceShape {
                    id: province.id.clone(),
                    name: province.name.clone(),
                    color: province.color.clone(),
                    path: svg_path(outline),
                    label: ctx.projector.canvas(EntityKind::Province, &province.id),
                    highlight: ctx.highlight(EntityKind::Province, &province.id),
                })
            })
            .collect();

        let mut markers = Vec::new();
        let mut omitted = Vec::new();
        if ctx.state.selected_province_id.is_some() {
            for entry in ctx.departments {
                let id = entry.department.id.as_str();
                match ctx.projector.canvas(EntityKind::Department, id) {
                    Some(point) => markers.push(DepartmentMarker {
                        id: id.to_string(),
                        name: entry.department.name.clone(),
                        x: point.x,
                        y: point.y,
                        highlight: ctx.highlight(EntityKind::Department, id),
                    }),
                    None => omitted.push(id.to_string()),
                }
            }
        }

        PolygonMapOutput {
            width: size.width,
            height: size.height,
            provinces,
            markers,
            omitted,
        }
    }

    /// Intent for a click at `point`: a visible department marker wins over
    /// the province underneath it.
    pub fn hit_test(&self, ctx: &RenderContext<'_>, point: CanvasPoint) -> Option<Intent> {
        self.target_at(ctx, point).map(|(kind, id)| match kind {
            EntityKind::Department => self.on_select_department(id),
            EntityKind::Province => self.on_select_province(id),
        })
    }

    /// Intent for the pointer resting at `point`. Leaving every shape
    /// clears the hover.
    pub fn hover_test(&self, ctx: &RenderContext<'_>, point: CanvasPoint) -> Intent {
        match self.target_at(ctx, point) {
            Some((kind, id)) => self.on_hover(kind, id),
            None => self.on_clear_hover(),
        }
    }

    fn target_at<'a>(
        &self,
        ctx: &RenderContext<'a>,
        point: CanvasPoint,
    ) -> Option<(EntityKind, &'a str)> {
        if ctx.state.selected_province_id.is_some() {
            let marker = ctx
                .departments
                .iter()
                .filter_map(|entry| {
                    let id = entry.department.id.as_str();
                    ctx.projector
                        .canvas(EntityKind::Department, id)
                        .map(|pos| (id, pos.distance_to(&point)))
                })
                .filter(|(_, distance)| *distance <= CANVAS_MARKER_HIT_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1));

            if let Some((id, _)) = marker {
                return Some((EntityKind::Department, id));
            }
        }

        ctx.projector
            .hit_test_canvas(point)
            .map(|id| (EntityKind::Province, id))
    }

    /// Standalone SVG document of the current render
    pub fn svg(&self, ctx: &RenderContext<'_>) -> Result<String, TemplateError> {
        render_template(SVG_TEMPLATE, self.build(ctx))
    }
}

impl MapView for PolygonMapView {
    fn kind(&self) -> ViewKind {
        ViewKind::PolygonMap
    }

    fn render(&mut self, ctx: &RenderContext<'_>) -> ViewOutput {
        ViewOutput::PolygonMap(self.build(ctx))
    }
}

fn svg_path(outline: &[CanvasPoint]) -> String {
    let mut path = String::new();
    for (i, point) in outline.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{}{:.1} {:.1} ", command, point.x, point.y));
    }
    path.push('Z');
    path
}
