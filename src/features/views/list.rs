use serde::Serialize;

use crate::features::selection::filter::filter_with_search;
use crate::features::territories::models::{DepartmentStatus, EntityKind, SpecialZone};
use crate::features::territories::services::DepartmentEntry;
use crate::features::views::adapter::{Highlight, MapView, RenderContext, ViewKind, ViewOutput};
use crate::shared::constants::ALL_DEPARTMENTS_TITLE;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCard {
    pub id: String,
    pub name: String,
    pub code: String,
    pub chef_lieu: String,
    pub population: u64,
    pub budget: u64,
    pub competences: u8,
    pub status: DepartmentStatus,
    pub special_zone: Option<SpecialZone>,
    pub is_capital: bool,
    pub province_id: String,
    pub province_name: String,
    pub selected: bool,
    pub hovered: bool,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceHeader {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capital: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput {
    pub title: String,
    pub province: Option<ProvinceHeader>,
    pub search: Option<String>,
    pub total: usize,
    pub cards: Vec<DepartmentCard>,
}

/// Card grid of the filtered departments. Coordinates play no part here.
#[derive(Debug, Default)]
pub struct ListView;

impl ListView {
    fn card(entry: DepartmentEntry<'_>, ctx: &RenderContext<'_>) -> DepartmentCard {
        let department = entry.department;
        let highlight = ctx.highlight(EntityKind::Department, &department.id);

        DepartmentCard {
            id: department.id.clone(),
            name: department.name.clone(),
            code: department.code.clone(),
            chef_lieu: department.chef_lieu.clone(),
            population: department.population,
            budget: department.budget,
            competences: department.competences,
            status: department.status,
            special_zone: department.special_zone,
            is_capital: department.is_capital,
            province_id: entry.province.id.clone(),
            province_name: entry.province.name.clone(),
            selected: highlight == Highlight::Selected,
            hovered: ctx.state.is_hovered(EntityKind::Department, &department.id),
            highlight,
        }
    }
}

impl MapView for ListView {
    fn kind(&self) -> ViewKind {
        ViewKind::List
    }

    fn render(&mut self, ctx: &RenderContext<'_>) -> ViewOutput {
        let province = ctx
            .state
            .selected_province_id
            .as_deref()
            .and_then(|id| ctx.repo.province(id));

        let search = ctx.search.map(str::trim).filter(|term| !term.is_empty());
        let cards: Vec<DepartmentCard> =
            filter_with_search(ctx.departments.iter().copied(), ctx.state, search)
                .into_iter()
                .map(|entry| Self::card(entry, ctx))
                .collect();

        ViewOutput::List(ListOutput {
            title: province
                .map(|p| p.name.clone())
                .unwrap_or_else(|| ALL_DEPARTMENTS_TITLE.to_string()),
            province: province.map(|p| ProvinceHeader {
                id: p.id.clone(),
                name: p.name.clone(),
                code: p.code.clone(),
                capital: p.capital.clone(),
                color: p.color.clone(),
            }),
            search: search.map(str::to_string),
            total: cards.len(),
            cards,
        })
    }
}
