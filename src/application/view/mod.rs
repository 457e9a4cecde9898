//! Views that turn handler output into a response body.
//!
//! [`build_view`] picks the implementation for a negotiated [`ViewClass`]:
//! [`HtmlView`] for markup and [`SpreadsheetView`] for `.xlsx` downloads.

pub mod encoder;
mod error;
pub mod filename;
mod html;
mod options;
mod response;
mod spreadsheet;
pub mod template;

pub use encoder::{EncodeError, SheetWriter, WriterFactory, XLSX_FORMAT, XlsxWriterFactory};
pub use error::ViewError;
pub use html::HtmlView;
pub use options::{
    DEFAULT_LAYOUT, DEFAULT_TEMPLATE, ERROR_TEMPLATE_PATH, FILENAME_VAR, ViewOptions,
    ViewRequest, ViewVars,
};
pub use response::{RenderedBody, RenderedView, ViewResponse};
pub use spreadsheet::{SpreadsheetView, XLSX_SUB_DIR};
pub use template::{TemplateEngine, TemplateError, TemplateRegistry, TemplateScope};

use crate::application::negotiation::ViewClass;

/// A per-request renderer.
pub trait View {
    fn render(
        &mut self,
        engine: &dyn TemplateEngine,
        template: Option<&str>,
        layout: Option<&str>,
    ) -> Result<RenderedView, ViewError>;
}

/// Instantiate the view registered for `class`.
pub fn build_view(class: ViewClass, request: ViewRequest, options: ViewOptions) -> Box<dyn View> {
    match class {
        ViewClass::Html => Box::new(HtmlView::new(request, options)),
        ViewClass::Spreadsheet => Box::new(SpreadsheetView::new(request, options)),
    }
}

/// Join template path segments, skipping absent or empty ones.
fn resolve_path(segments: &[Option<&str>]) -> String {
    segments
        .iter()
        .flatten()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
