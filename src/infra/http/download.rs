//! Turns rendered views into HTTP responses.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::warn;

use crate::application::{
    error::HttpError,
    negotiation::ViewClass,
    view::{RenderedView, TemplateEngine, ViewOptions, ViewRequest, build_view},
};
use crate::domain::representation::HTML_MEDIA_TYPE;

const FALLBACK_DOWNLOAD_NAME: &str = "download.xlsx";

/// Build the view for `class`, render it, and convert the result to a response.
pub fn render_response(
    engine: &dyn TemplateEngine,
    class: ViewClass,
    request: ViewRequest,
    options: ViewOptions,
) -> Response {
    let path = request.path.clone();
    let mut view = build_view(class, request, options);
    match view.render(engine, None, None) {
        Ok(rendered) => rendered.into_response(),
        Err(err) => {
            counter!("sheetview_render_failed_total").increment(1);
            warn!(
                target = "sheetview::http::render",
                path = %path,
                view = ?class,
                error = %err,
                "view render failed"
            );
            HttpError::from(err).into_response()
        }
    }
}

impl IntoResponse for RenderedView {
    fn into_response(self) -> Response {
        let RenderedView { response: meta, body } = self;
        let bytes = body.into_bytes();
        let length = bytes.len();

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = meta.status();

        let headers = response.headers_mut();

        let content_type = if meta.is_html() {
            format!("{HTML_MEDIA_TYPE}; charset=utf-8")
        } else {
            meta.content_type().to_string()
        };
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }

        if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }

        if let Some(filename) = meta.download() {
            match content_disposition(filename) {
                Some(value) => {
                    headers.insert(header::CONTENT_DISPOSITION, value);
                }
                None => {
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                }
            }
        }

        response
    }
}

/// `attachment` disposition for `filename`; non-ASCII names also get an
/// RFC 5987 `filename*` parameter. Quotes and backslashes never reach the
/// quoted-string.
pub fn content_disposition(filename: &str) -> Option<HeaderValue> {
    let safe_name = filename.replace('"', "'").replace('\\', "_");
    let value = if safe_name.is_ascii() && !safe_name.chars().any(char::is_control) {
        format!("attachment; filename=\"{safe_name}\"")
    } else {
        let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("attachment; filename=\"{FALLBACK_DOWNLOAD_NAME}\"; filename*=UTF-8''{encoded}")
    };
    HeaderValue::from_str(&value).ok()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use bytes::Bytes;

    use super::*;
    use crate::application::view::ViewResponse;
    use crate::domain::representation::SPREADSHEET_MEDIA_TYPE;

    #[test]
    fn ascii_names_use_plain_filename() {
        let value = content_disposition("Report.xlsx").expect("header");
        assert_eq!(value, "attachment; filename=\"Report.xlsx\"");
    }

    #[test]
    fn quotes_are_neutralised() {
        let value = content_disposition("say \"hi\".xlsx").expect("header");
        assert_eq!(value, "attachment; filename=\"say 'hi'.xlsx\"");
    }

    #[test]
    fn backslashes_are_neutralised() {
        let value = content_disposition("a\\b.xlsx").expect("header");
        assert_eq!(value, "attachment; filename=\"a_b.xlsx\"");
    }

    #[test]
    fn non_ascii_names_are_percent_encoded() {
        let value = content_disposition("报表.xlsx").expect("header");
        assert_eq!(
            value,
            "attachment; filename=\"download.xlsx\"; filename*=UTF-8''%E6%8A%A5%E8%A1%A8.xlsx"
        );
    }

    #[test]
    fn binary_view_becomes_attachment() {
        let meta = ViewResponse::new(StatusCode::OK)
            .with_type("xlsx")
            .with_download("sales-q1.xlsx");
        let response =
            RenderedView::binary(meta, Bytes::from_static(b"PK\x03\x04")).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], SPREADSHEET_MEDIA_TYPE);
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"sales-q1.xlsx\""
        );
    }

    #[test]
    fn html_view_is_inline() {
        let meta = ViewResponse::new(StatusCode::NOT_FOUND).with_type("html");
        let response = RenderedView::text(meta, "<p>gone</p>".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    }
}
