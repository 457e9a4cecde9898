use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        negotiation::{Negotiation, ViewClass},
        reports::{MESSAGE_VAR, REPORT_VAR, STATUS_VAR, TITLE_VAR},
        view::{
            FILENAME_VAR, TemplateRegistry, ViewOptions, ViewRequest, ViewVars,
            filename::XLSX_SUFFIX,
        },
    },
    domain::reports::sales_report,
};

use super::{
    download::render_response,
    middleware::{log_responses, set_request_context},
    negotiate::negotiate_view,
};

#[derive(Clone)]
pub struct HttpState {
    pub negotiation: Arc<Negotiation>,
    pub templates: Arc<TemplateRegistry>,
    pub default_layout: Arc<str>,
}

impl HttpState {
    pub fn new(
        negotiation: Negotiation,
        templates: TemplateRegistry,
        default_layout: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            negotiation: Arc::new(negotiation),
            templates: Arc::new(templates),
            default_layout: default_layout.into(),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    let negotiation = Arc::clone(&state.negotiation);

    Router::new()
        .route("/sales/{quarter}", get(sales))
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn_with_state(negotiation, negotiate_view))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DownloadQuery {
    filename: Option<String>,
}

async fn sales(
    State(state): State<HttpState>,
    Extension(class): Extension<ViewClass>,
    Path(quarter): Path<String>,
    Query(query): Query<DownloadQuery>,
    uri: Uri,
) -> Response {
    let request = ViewRequest::new(uri.path());
    let quarter = quarter.strip_suffix(XLSX_SUFFIX).unwrap_or(&quarter);

    let Some(report) = sales_report(quarter) else {
        return not_found(&state, class, request);
    };

    let mut vars = ViewVars::new();
    if let Err(err) = vars.set_serialized(REPORT_VAR, &report) {
        return HttpError::from_error(
            "infra::http::sales",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            &err,
        )
        .into_response();
    }
    vars.set(TITLE_VAR, report.title.clone());
    if let Some(filename) = query.filename.filter(|name| !name.trim().is_empty()) {
        vars.set(FILENAME_VAR, filename);
    }

    let options = ViewOptions::new("Sales")
        .with_layout(state.default_layout.as_ref())
        .with_vars(vars);
    render_response(state.templates.as_ref(), class, request, options)
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(
    State(state): State<HttpState>,
    Extension(class): Extension<ViewClass>,
    uri: Uri,
) -> Response {
    let request = ViewRequest::new(uri.path());
    not_found(&state, class, request)
}

/// Render the not-found page through the negotiated view; spreadsheet
/// requests degrade to HTML on the error path.
fn not_found(state: &HttpState, class: ViewClass, request: ViewRequest) -> Response {
    let status = StatusCode::NOT_FOUND;
    let options = ViewOptions::error("not_found", status)
        .with_layout(state.default_layout.as_ref())
        .with_var(STATUS_VAR, status.as_u16())
        .with_var(MESSAGE_VAR, "Resource not found")
        .with_var(TITLE_VAR, "Not found");

    let mut response = render_response(state.templates.as_ref(), class, request, options);
    ErrorReport::from_message("infra::http::not_found", status, "Resource not found")
        .attach(&mut response);
    response
}
