use std::collections::HashSet;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use metrics_util::debugging::DebuggingRecorder;
use sheetview::{
    application::{negotiation::Negotiation, reports::report_templates, view::TemplateRegistry},
    infra::http::{HttpState, build_router},
};
use tower::ServiceExt;

#[tokio::test]
async fn render_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = build_router(HttpState::new(
        Negotiation::with_spreadsheet_support(),
        report_templates(),
        "default",
    ));

    for (uri, status) in [
        ("/sales/q1.xlsx", StatusCode::OK),
        ("/sales/q1", StatusCode::OK),
        ("/nowhere", StatusCode::NOT_FOUND),
    ] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        assert_eq!(response.status(), status, "unexpected status for {uri}");
    }

    let broken = build_router(HttpState::new(
        Negotiation::with_spreadsheet_support(),
        TemplateRegistry::new(),
        "default",
    ));
    let request = Request::builder()
        .uri("/sales/q1.xlsx")
        .body(Body::empty())
        .expect("request should build");
    let response = broken
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        "sheetview_render_total",
        "sheetview_render_bytes",
        "sheetview_render_failed_total",
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
