//! View templates rendered with Jinja2 syntax.

mod engine;

pub use engine::{render_template, TemplateError};
