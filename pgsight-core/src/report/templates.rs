//! SQL template resolution
//!
//! Templates are embedded at compile time and loaded into a single minijinja
//! environment on first use. Undefined behavior is strict: a template that
//! references a parameter the caller did not supply fails the render instead
//! of silently emitting nothing.

use minijinja::{Environment, UndefinedBehavior};
use once_cell::sync::Lazy;

use crate::error::{ReportError, ReportResult};
use crate::report::{registry, ReportParams, ReportSource};

static ENVIRONMENT: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    for definition in registry::all() {
        if let ReportSource::Sql { template } = definition.source {
            env.add_template(definition.name, template)
                .expect("embedded template parses");
        }
    }
    env
});

/// Render the SQL template registered under `name` against validated params
pub fn resolve(name: &str, params: &ReportParams) -> ReportResult<String> {
    let template = ENVIRONMENT
        .get_template(name)
        .map_err(|_| ReportError::DefinitionNotFound(name.to_string()))?;
    template
        .render(params)
        .map_err(|e| ReportError::TemplateRender(format!("{name}: {e}")))
}
