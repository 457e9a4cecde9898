//! Template seam between views and the code that fills them.
//!
//! A view resolves template and layout paths, then hands a [`TemplateScope`]
//! to a [`TemplateEngine`]. Spreadsheet templates write cells through
//! [`TemplateScope::workbook_mut`]; HTML templates return markup.

use std::collections::HashMap;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::options::ViewVars;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{path}` could not be found")]
    MissingTemplate { path: String },
    #[error("layout `{path}` could not be found")]
    MissingLayout { path: String },
    #[error("view variable `{name}` is missing")]
    MissingVar { name: String },
    #[error("view variable `{name}` has an unexpected shape: {source}")]
    InvalidVar {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("template markup failed to render: {0}")]
    Markup(#[from] askama::Error),
    #[error("workbook update failed: {0}")]
    Workbook(#[from] XlsxError),
    #[error("no workbook is allocated for this view")]
    WorkbookNotAllocated,
}

/// What a template can see while it renders.
pub struct TemplateScope<'v> {
    vars: &'v ViewVars,
    workbook: Option<&'v mut Workbook>,
}

impl<'v> TemplateScope<'v> {
    pub fn new(vars: &'v ViewVars, workbook: Option<&'v mut Workbook>) -> Self {
        Self { vars, workbook }
    }

    /// Deserialize the variable `name` into `T`.
    pub fn var<T: DeserializeOwned>(&self, name: &str) -> Result<T, TemplateError> {
        let value = self
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::MissingVar {
                name: name.to_string(),
            })?;
        serde_json::from_value(value).map_err(|source| TemplateError::InvalidVar {
            name: name.to_string(),
            source,
        })
    }

    pub fn has_workbook(&self) -> bool {
        self.workbook.is_some()
    }

    pub fn workbook_mut(&mut self) -> Result<&mut Workbook, TemplateError> {
        self.workbook
            .as_deref_mut()
            .ok_or(TemplateError::WorkbookNotAllocated)
    }
}

/// Renders a resolved template path, optionally wrapped in a layout.
pub trait TemplateEngine: Send + Sync {
    fn render(
        &self,
        scope: &mut TemplateScope<'_>,
        template: &str,
        layout: Option<&str>,
    ) -> Result<String, TemplateError>;
}

type TemplateFn = dyn Fn(&mut TemplateScope<'_>) -> Result<String, TemplateError> + Send + Sync;
type LayoutFn = dyn Fn(&TemplateScope<'_>, String) -> Result<String, TemplateError> + Send + Sync;

/// Template engine backed by registered closures keyed by resolved path.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Box<TemplateFn>>,
    layouts: HashMap<String, Box<LayoutFn>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_template<F>(&mut self, path: impl Into<String>, template: F) -> &mut Self
    where
        F: Fn(&mut TemplateScope<'_>) -> Result<String, TemplateError> + Send + Sync + 'static,
    {
        self.templates.insert(path.into(), Box::new(template));
        self
    }

    pub fn register_layout<F>(&mut self, path: impl Into<String>, layout: F) -> &mut Self
    where
        F: Fn(&TemplateScope<'_>, String) -> Result<String, TemplateError> + Send + Sync + 'static,
    {
        self.layouts.insert(path.into(), Box::new(layout));
        self
    }
}

impl TemplateEngine for TemplateRegistry {
    fn render(
        &self,
        scope: &mut TemplateScope<'_>,
        template: &str,
        layout: Option<&str>,
    ) -> Result<String, TemplateError> {
        let render_template =
            self.templates
                .get(template)
                .ok_or_else(|| TemplateError::MissingTemplate {
                    path: template.to_string(),
                })?;
        let content = render_template(&mut *scope)?;

        let Some(layout) = layout else {
            return Ok(content);
        };
        let render_layout = self
            .layouts
            .get(layout)
            .ok_or_else(|| TemplateError::MissingLayout {
                path: layout.to_string(),
            })?;
        render_layout(&*scope, content)
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut templates: Vec<_> = self.templates.keys().collect();
        templates.sort();
        let mut layouts: Vec<_> = self.layouts.keys().collect();
        layouts.sort();
        f.debug_struct("TemplateRegistry")
            .field("templates", &templates)
            .field("layouts", &layouts)
            .finish()
    }
}
