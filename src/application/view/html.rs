use metrics::counter;
use tracing::debug;

use crate::domain::representation::{HTML_EXTENSION, Representation};

use super::{
    View,
    error::ViewError,
    options::{ViewOptions, ViewRequest, ViewVars},
    resolve_path,
    response::{RenderedView, ViewResponse},
    template::{TemplateEngine, TemplateScope},
};

/// Plain HTML view; templates resolve directly under their template path.
pub struct HtmlView {
    request: ViewRequest,
    template_path: Option<String>,
    template: String,
    layout: Option<String>,
    auto_layout: bool,
    vars: ViewVars,
    response: ViewResponse,
}

impl HtmlView {
    pub fn new(request: ViewRequest, options: ViewOptions) -> Self {
        let ViewOptions {
            template_path,
            template,
            layout,
            auto_layout,
            status,
            vars,
        } = options;

        Self {
            request,
            template_path,
            template,
            layout,
            auto_layout,
            vars,
            response: ViewResponse::new(status).with_type(HTML_EXTENSION),
        }
    }

    pub fn template_file(&self, name: &str) -> String {
        resolve_path(&[self.template_path.as_deref(), Some(name)])
    }

    pub fn layout_file(&self, name: Option<&str>) -> Option<String> {
        if !self.auto_layout {
            return None;
        }
        let name = name.or(self.layout.as_deref())?;
        Some(resolve_path(&[Some("layout"), Some(name)]))
    }
}

impl View for HtmlView {
    fn render(
        &mut self,
        engine: &dyn TemplateEngine,
        template: Option<&str>,
        layout: Option<&str>,
    ) -> Result<RenderedView, ViewError> {
        let template_file = self.template_file(template.unwrap_or(self.template.as_str()));
        let layout_file = self.layout_file(layout);

        let mut scope = TemplateScope::new(&self.vars, None);
        let content = engine.render(&mut scope, &template_file, layout_file.as_deref())?;

        counter!("sheetview_render_total", "representation" => Representation::Html.token())
            .increment(1);
        debug!(
            target = "sheetview::view",
            path = %self.request.path,
            template = %template_file,
            "html rendered"
        );
        Ok(RenderedView::text(self.response.clone(), content))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::application::view::{response::RenderedBody, template::TemplateRegistry};

    #[test]
    fn renders_template_inside_layout() {
        let mut engine = TemplateRegistry::new();
        engine
            .register_template("Sales/index", |scope| {
                assert!(!scope.has_workbook());
                Ok("<table></table>".to_string())
            })
            .register_layout("layout/default", |_, content| {
                Ok(format!("<body>{content}</body>"))
            });

        let request = ViewRequest::new("/sales/q1");
        let mut view = HtmlView::new(request, ViewOptions::new("Sales"));
        let rendered = view.render(&engine, None, None).expect("rendered");

        assert_eq!(rendered.response.status(), StatusCode::OK);
        assert!(rendered.response.is_html());
        assert_eq!(
            rendered.body,
            RenderedBody::Text("<body><table></table></body>".to_string())
        );
    }
}
