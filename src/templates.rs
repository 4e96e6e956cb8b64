//! Template loading and rendering using Tera.
//!
//! The CLI views are rendered from templates embedded in the binary. A
//! directory of `.tera` files (by default `~/.habit-tracker/templates`)
//! overrides any embedded template with the same name.

use crate::error::{Error, Result};
use crate::paths;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tera::{Context, Tera};

/// Override directory name inside the data directory.
const TEMPLATES_DIR: &str = "templates";

/// Task list with today's summary.
pub const DASHBOARD: &str = "dashboard.tera";

/// Completion figures and per-task consistency.
pub const STATS: &str = "stats.tera";

/// A single day's note.
pub const NOTE: &str = "note.tera";

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(DASHBOARD, include_str!("../templates/dashboard.tera"));
    m.insert(STATS, include_str!("../templates/stats.tera"));
    m.insert(NOTE, include_str!("../templates/note.tera"));
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

fn default_templates_dir() -> Option<PathBuf> {
    paths::data_dir().map(|dir| dir.join(TEMPLATES_DIR))
}

/// Initialize the template engine with templates from the specified directory.
///
/// If the directory doesn't exist, templates are loaded from embedded defaults.
///
/// # Errors
///
/// Returns an error if the directory contains invalid templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let dir = templates_dir.map(Path::to_path_buf).or_else(default_templates_dir);

    let mut tera = Tera::default();

    if let Some(dir) = dir.filter(|d| d.exists()) {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
        tracing::debug!(dir = %dir.display(), "loaded template overrides");
    }

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::Template(format!("Embedded template {name} is invalid: {e}")))?;
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Render a template with the given context.
///
/// The engine is initialized on first use.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Render a template with a single serializable value bound to `key`.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or rendering fails.
pub fn render_value<T: serde::Serialize>(name: &str, key: &str, value: &T) -> Result<String> {
    let mut ctx = Context::new();
    ctx.insert(key, value);
    render(name, &ctx)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// Get the list of all embedded template names.
#[cfg(test)]
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}
