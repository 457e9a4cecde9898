use askama::Template;

use crate::application::view::TemplateError;
use crate::domain::reports::SalesReport;

/// Render an askama template into markup for the template registry.
pub fn render_markup<T: Template>(template: &T) -> Result<String, TemplateError> {
    template.render().map_err(TemplateError::from)
}

#[derive(Template)]
#[template(path = "layout/default.html")]
pub struct LayoutTemplate<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Clone, Debug)]
pub struct SalesRowView {
    pub region: String,
    pub units: String,
    pub revenue: String,
}

#[derive(Clone, Debug)]
pub struct SalesReportView {
    pub title: String,
    pub download_href: String,
    pub rows: Vec<SalesRowView>,
    pub total_units: String,
    pub total_revenue: String,
}

impl SalesReportView {
    pub fn from_report(report: &SalesReport, download_href: impl Into<String>) -> Self {
        Self {
            title: report.title.clone(),
            download_href: download_href.into(),
            rows: report
                .rows
                .iter()
                .map(|row| SalesRowView {
                    region: row.region.clone(),
                    units: row.units.to_string(),
                    revenue: format_money(row.revenue),
                })
                .collect(),
            total_units: report.total_units().to_string(),
            total_revenue: format_money(report.total_revenue()),
        }
    }
}

fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

#[derive(Template)]
#[template(path = "sales/index.html")]
pub struct SalesTableTemplate {
    pub report: SalesReportView,
}

#[derive(Clone, Debug)]
pub struct ErrorPageView {
    pub status: u16,
    pub message: String,
}

#[derive(Template)]
#[template(path = "error/page.html")]
pub struct ErrorPageTemplate {
    pub error: ErrorPageView,
}
