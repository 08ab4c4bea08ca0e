//! Template engine for view markup.
//!
//! Templates are compiled into the binary from `templates/views/` and
//! registered in a process-wide environment on first use.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const VIEW_TEMPLATES: &[(&str, &str)] = &[(
    "views/polygon_map.svg.jinja",
    include_str!("../../../templates/views/polygon_map.svg.jinja"),
)];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    // SVG is markup: escape interpolated names like HTML
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".svg.jinja") || name.ends_with(".html.jinja") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    for (name, source) in VIEW_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a view template with any serializable context.
///
/// # Example
/// ```ignore
/// let svg = render_template("views/polygon_map.svg.jinja", &view)?;
/// ```
pub fn render_template<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_is_not_found() {
        let result = render_template("views/missing.jinja", serde_json::json!({}));
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
