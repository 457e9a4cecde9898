//! Templates for the bundled sales report routes.
//!
//! The same handler output renders as an HTML table or, through the
//! spreadsheet view, as a workbook with a totals row and a revenue chart.

use rust_xlsxwriter::{Chart, ChartType, Format};

use crate::application::view::{TemplateError, TemplateRegistry, TemplateScope};
use crate::domain::reports::SalesReport;
use crate::presentation::views::{
    ErrorPageTemplate, ErrorPageView, LayoutTemplate, SalesReportView, SalesTableTemplate,
    render_markup,
};

/// View variable holding the serialized [`SalesReport`].
pub const REPORT_VAR: &str = "report";
/// View variable holding the page title used by the HTML layout.
pub const TITLE_VAR: &str = "title";
/// View variable holding the message shown on error pages.
pub const MESSAGE_VAR: &str = "message";
/// View variable holding the HTTP status shown on error pages.
pub const STATUS_VAR: &str = "status";

const DEFAULT_TITLE: &str = "sheetview";

/// Build the template registry serving the sales report and error pages.
pub fn report_templates() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    register_templates(&mut registry);
    registry
}

pub fn register_templates(registry: &mut TemplateRegistry) {
    registry
        .register_template("Sales/index", sales_table)
        .register_template("Sales/xlsx/index", sales_workbook)
        .register_template("Error/not_found", error_page)
        .register_layout("layout/default", html_layout)
        .register_layout("layout/xlsx/default", |_, content| Ok(content));
}

fn sales_table(scope: &mut TemplateScope<'_>) -> Result<String, TemplateError> {
    let report: SalesReport = scope.var(REPORT_VAR)?;
    let download_href = format!("/sales/{}.xlsx", report.quarter);
    render_markup(&SalesTableTemplate {
        report: SalesReportView::from_report(&report, download_href),
    })
}

fn sales_workbook(scope: &mut TemplateScope<'_>) -> Result<String, TemplateError> {
    let report: SalesReport = scope.var(REPORT_VAR)?;
    let sheet_name = report.quarter.to_ascii_uppercase();

    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let total_money = Format::new().set_bold().set_num_format("#,##0.00");

    let workbook = scope.workbook_mut()?;
    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_name)?;
    sheet.set_column_width(0, 16)?;
    sheet.set_column_width(2, 14)?;

    for (col, title) in (0u16..).zip(["Region", "Units", "Revenue"]) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }

    let mut row = 1u32;
    for entry in &report.rows {
        sheet.write_string(row, 0, &entry.region)?;
        sheet.write_number(row, 1, entry.units)?;
        sheet.write_number_with_format(row, 2, entry.revenue, &money)?;
        row += 1;
    }

    let last_data_row = row - 1;
    sheet.write_string_with_format(row, 0, "Total", &header)?;
    sheet.write_formula_with_format(row, 1, format!("=SUM(B2:B{})", row).as_str(), &header)?;
    sheet.write_formula_with_format(
        row,
        2,
        format!("=SUM(C2:C{})", row).as_str(),
        &total_money,
    )?;

    if !report.rows.is_empty() {
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name("Revenue")
            .set_categories((sheet_name.as_str(), 1, 0, last_data_row, 0))
            .set_values((sheet_name.as_str(), 1, 2, last_data_row, 2));
        chart.title().set_name(report.title.as_str());
        sheet.insert_chart(1, 4, &chart)?;
    }

    Ok(String::new())
}

fn error_page(scope: &mut TemplateScope<'_>) -> Result<String, TemplateError> {
    let status: u16 = scope.var(STATUS_VAR).unwrap_or(500);
    let message: String = scope
        .var(MESSAGE_VAR)
        .unwrap_or_else(|_| "Unexpected error occurred".to_string());
    let error = ErrorPageView { status, message };
    render_markup(&ErrorPageTemplate { error })
}

fn html_layout(scope: &TemplateScope<'_>, content: String) -> Result<String, TemplateError> {
    let title: String = scope
        .var(TITLE_VAR)
        .unwrap_or_else(|_| DEFAULT_TITLE.to_string());
    render_markup(&LayoutTemplate {
        title: &title,
        content: &content,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::application::view::{
        RenderedBody, SpreadsheetView, ViewOptions, ViewRequest, ViewVars,
    };
    use crate::domain::reports::sales_report;

    fn report_vars(quarter: &str) -> ViewVars {
        let mut vars = ViewVars::new();
        vars.set_serialized(REPORT_VAR, &sales_report(quarter).expect("report"))
            .expect("serializable");
        vars
    }

    #[test]
    fn workbook_template_fills_the_view_workbook() {
        let request = ViewRequest::new("/sales/q3.xlsx");
        let options = ViewOptions::new("Sales").with_vars(report_vars("q3"));
        let mut view = SpreadsheetView::new(request, options);

        let rendered = view
            .render(&report_templates(), None, None)
            .expect("rendered");
        assert_eq!(rendered.response.download(), Some("sales-q3.xlsx"));
        assert!(matches!(
            rendered.body,
            RenderedBody::Binary(ref bytes) if bytes.starts_with(b"PK")
        ));

        let workbook = view.workbook_mut().expect("workbook");
        let sheet = workbook.worksheet_from_index(0).expect("sheet");
        assert_eq!(sheet.name(), "Q3");
    }

    #[test]
    fn workbook_template_requires_report_var() {
        let request = ViewRequest::new("/sales/q3.xlsx");
        let mut view = SpreadsheetView::new(request, ViewOptions::new("Sales"));
        let err = view
            .render(&report_templates(), None, None)
            .expect_err("missing report");
        assert_eq!(err.to_string(), "view variable `report` is missing");
    }

    #[test]
    fn error_page_uses_status_and_message_vars() {
        let request = ViewRequest::new("/nope.xlsx");
        let options = ViewOptions::error("not_found", StatusCode::NOT_FOUND)
            .with_var(STATUS_VAR, 404)
            .with_var(MESSAGE_VAR, "Resource not found")
            .with_var(TITLE_VAR, "Not found");
        let mut view = SpreadsheetView::new(request, options);

        let rendered = view
            .render(&report_templates(), None, None)
            .expect("rendered");
        let RenderedBody::Text(html) = rendered.body else {
            panic!("expected html body");
        };
        assert!(html.contains("<title>Not found</title>"));
        assert!(html.contains("<h1>404</h1>"));
    }
}
