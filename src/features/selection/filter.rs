//! Department subset derived from the catalogue and the current selection.
//!
//! Pure functions, cheap enough to run on every render.

use crate::features::selection::models::SelectionState;
use crate::features::territories::services::DepartmentEntry;
use crate::shared::validation::fold_for_search;

/// Departments of the selected province in their original order, or every
/// department when no province is selected.
pub fn filter<'a, I>(all: I, state: &SelectionState) -> Vec<DepartmentEntry<'a>>
where
    I: IntoIterator<Item = DepartmentEntry<'a>>,
{
    match state.selected_province_id.as_deref() {
        None => all.into_iter().collect(),
        Some(province_id) => all
            .into_iter()
            .filter(|entry| entry.department.province_id == province_id)
            .collect(),
    }
}

/// [`filter`] narrowed by a free-text search term (list view search box).
pub fn filter_with_search<'a, I>(
    all: I,
    state: &SelectionState,
    term: Option<&str>,
) -> Vec<DepartmentEntry<'a>>
where
    I: IntoIterator<Item = DepartmentEntry<'a>>,
{
    let folded = term.map(|t| fold_for_search(t.trim())).unwrap_or_default();
    filter(all, state)
        .into_iter()
        .filter(|entry| entry.matches(&folded))
        .collect()
}
