//! Cross-view selection: the single source of truth for what is selected and
//! hovered, and the department filter derived from it.

pub mod controller;
pub mod filter;
pub mod models;

pub use controller::SelectionStateController;
pub use models::{Hover, Intent, SelectionState, Transition};
