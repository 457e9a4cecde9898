//! View that renders handler output as an `.xlsx` download.
//!
//! The view owns one workbook per request. Templates populate it through the
//! [`TemplateScope`] handed to the engine; once they return, the workbook is
//! encoded and the response is marked as an attachment. A view built for the
//! error page never allocates a workbook and renders plain HTML instead.

use std::sync::Arc;

use bytes::Bytes;
use metrics::{counter, histogram};
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::domain::representation::{HTML_EXTENSION, Representation, SPREADSHEET_EXTENSION};

use super::{
    View,
    encoder::{WriterFactory, XLSX_FORMAT, XlsxWriterFactory},
    error::ViewError,
    filename::download_filename,
    options::{FILENAME_VAR, ViewOptions, ViewRequest, ViewVars},
    resolve_path,
    response::{RenderedView, ViewResponse},
    template::{TemplateEngine, TemplateScope},
};

/// Sub directory holding spreadsheet templates and layouts.
pub const XLSX_SUB_DIR: &str = "xlsx";
/// Template path addressing the spreadsheet template root directly.
const XLSX_ROOT_TEMPLATE_PATH: &str = "/xlsx";

pub struct SpreadsheetView {
    request: ViewRequest,
    template_path: Option<String>,
    template: String,
    layout: Option<String>,
    auto_layout: bool,
    sub_dir: Option<String>,
    layout_path: Option<String>,
    vars: ViewVars,
    response: ViewResponse,
    workbook: Option<Workbook>,
    content: Option<Bytes>,
    writers: Arc<dyn WriterFactory>,
}

impl SpreadsheetView {
    pub fn new(request: ViewRequest, options: ViewOptions) -> Self {
        Self::with_writer_factory(request, options, Arc::new(XlsxWriterFactory))
    }

    pub fn with_writer_factory(
        request: ViewRequest,
        options: ViewOptions,
        writers: Arc<dyn WriterFactory>,
    ) -> Self {
        let is_error_page = options.is_error_page();
        let ViewOptions {
            template_path,
            template,
            layout,
            auto_layout,
            status,
            vars,
        } = options;

        let mut sub_dir = (template_path.as_deref() != Some(XLSX_ROOT_TEMPLATE_PATH))
            .then(|| XLSX_SUB_DIR.to_string());
        let mut layout_path = Some(XLSX_SUB_DIR.to_string());
        let mut response = ViewResponse::new(status).with_type(SPREADSHEET_EXTENSION);

        let workbook = if is_error_page {
            sub_dir = None;
            layout_path = None;
            response = response.with_type(HTML_EXTENSION);
            None
        } else {
            Some(Workbook::new())
        };

        debug!(
            target = "sheetview::view",
            path = %request.path,
            template_path = template_path.as_deref().unwrap_or(""),
            error_page = is_error_page,
            "spreadsheet view created"
        );

        Self {
            request,
            template_path,
            template,
            layout,
            auto_layout,
            sub_dir,
            layout_path,
            vars,
            response,
            workbook,
            content: None,
            writers,
        }
    }

    /// Render `template` (or the configured one) inside `layout` and, unless
    /// this is the error page, encode the populated workbook.
    pub fn render(
        &mut self,
        engine: &dyn TemplateEngine,
        template: Option<&str>,
        layout: Option<&str>,
    ) -> Result<RenderedView, ViewError> {
        let template_file = self.template_file(template.unwrap_or(self.template.as_str()));
        let layout_file = self.layout_file(layout);

        let content = {
            let mut scope = TemplateScope::new(&self.vars, self.workbook.as_mut());
            engine.render(&mut scope, &template_file, layout_file.as_deref())?
        };

        if self.response.is_html() {
            counter!("sheetview_render_total", "representation" => self.representation().token())
                .increment(1);
            return Ok(RenderedView::text(self.response.clone(), content));
        }

        let bytes = self.finalize()?;
        self.content = Some(bytes.clone());
        self.response = self.response.clone().with_download(self.filename());

        counter!("sheetview_render_total", "representation" => self.representation().token())
            .increment(1);
        debug!(
            target = "sheetview::view",
            path = %self.request.path,
            template = %template_file,
            bytes = bytes.len(),
            filename = self.response.download().unwrap_or(""),
            "spreadsheet rendered"
        );

        Ok(RenderedView::binary(self.response.clone(), bytes))
    }

    /// Encode the workbook as an OOXML package.
    ///
    /// Formula precalculation is always off and charts are always included.
    pub fn finalize(&mut self) -> Result<Bytes, ViewError> {
        let workbook = self
            .workbook
            .as_mut()
            .ok_or(ViewError::WorkbookNotAllocated)?;

        let mut writer = self
            .writers
            .create_writer(workbook, XLSX_FORMAT)
            .ok_or_else(|| ViewError::EncoderUnavailable {
                format: XLSX_FORMAT.to_string(),
            })?;
        writer.set_pre_calculate_formulas(false);
        writer.set_include_charts(true);

        let mut buffer = Vec::new();
        writer.save(&mut buffer)?;

        histogram!("sheetview_render_bytes").record(buffer.len() as f64);
        Ok(Bytes::from(buffer))
    }

    /// Download name: the `_filename` view variable, or a slug of the request path.
    pub fn filename(&self) -> String {
        download_filename(self.vars.get(FILENAME_VAR), &self.request.path)
    }

    pub fn workbook(&self) -> Result<&Workbook, ViewError> {
        self.workbook.as_ref().ok_or(ViewError::WorkbookNotAllocated)
    }

    pub fn workbook_mut(&mut self) -> Result<&mut Workbook, ViewError> {
        self.workbook.as_mut().ok_or(ViewError::WorkbookNotAllocated)
    }

    pub fn representation(&self) -> Representation {
        if self.response.is_html() {
            Representation::Html
        } else {
            Representation::Spreadsheet
        }
    }

    pub fn response(&self) -> &ViewResponse {
        &self.response
    }

    /// Encoded payload, present after a successful spreadsheet render.
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    pub fn sub_dir(&self) -> Option<&str> {
        self.sub_dir.as_deref()
    }

    pub fn layout_path(&self) -> Option<&str> {
        self.layout_path.as_deref()
    }

    pub fn template_file(&self, name: &str) -> String {
        resolve_path(&[
            self.template_path.as_deref(),
            self.sub_dir.as_deref(),
            Some(name),
        ])
    }

    pub fn layout_file(&self, name: Option<&str>) -> Option<String> {
        if !self.auto_layout {
            return None;
        }
        let name = name.or(self.layout.as_deref())?;
        Some(resolve_path(&[
            Some("layout"),
            self.layout_path.as_deref(),
            Some(name),
        ]))
    }
}

impl View for SpreadsheetView {
    fn render(
        &mut self,
        engine: &dyn TemplateEngine,
        template: Option<&str>,
        layout: Option<&str>,
    ) -> Result<RenderedView, ViewError> {
        SpreadsheetView::render(self, engine, template, layout)
    }
}
