use axum::http::StatusCode;
use bytes::Bytes;

use crate::domain::representation::{
    HTML_MEDIA_TYPE, SPREADSHEET_EXTENSION, SPREADSHEET_MEDIA_TYPE,
};

/// Response metadata a view decorates while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewResponse {
    status: StatusCode,
    content_type: String,
    download: Option<String>,
}

impl Default for ViewResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: HTML_MEDIA_TYPE.to_string(),
            download: None,
        }
    }
}

impl ViewResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Set the content type from a file extension such as `xlsx` or `html`.
    pub fn with_type(mut self, extension: &str) -> Self {
        self.content_type = content_type_for(extension);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_html(&self) -> bool {
        self.content_type == HTML_MEDIA_TYPE
    }

    pub fn download(&self) -> Option<&str> {
        self.download.as_deref()
    }

    /// Mark the response as a file download named `filename`.
    pub fn with_download(mut self, filename: impl Into<String>) -> Self {
        self.download = Some(filename.into());
        self
    }
}

fn content_type_for(extension: &str) -> String {
    if extension.eq_ignore_ascii_case(SPREADSHEET_EXTENSION) {
        return SPREADSHEET_MEDIA_TYPE.to_string();
    }
    mime_guess::from_ext(extension)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Rendered view body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Text(String),
    Binary(Bytes),
}

impl RenderedBody {
    pub fn len(&self) -> usize {
        match self {
            RenderedBody::Text(text) => text.len(),
            RenderedBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            RenderedBody::Text(text) => Bytes::from(text),
            RenderedBody::Binary(bytes) => bytes,
        }
    }
}

/// A finished view: response metadata plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub response: ViewResponse,
    pub body: RenderedBody,
}

impl RenderedView {
    pub fn text(response: ViewResponse, text: String) -> Self {
        Self {
            response,
            body: RenderedBody::Text(text),
        }
    }

    pub fn binary(response: ViewResponse, bytes: Bytes) -> Self {
        Self {
            response,
            body: RenderedBody::Binary(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_types_resolve_to_media_types() {
        let response = ViewResponse::default().with_type("xlsx");
        assert_eq!(response.content_type(), SPREADSHEET_MEDIA_TYPE);
        assert!(!response.is_html());

        let response = response.with_type("html");
        assert!(response.is_html());

        let response = response.with_type("csv");
        assert_eq!(response.content_type(), "text/csv");
    }

    #[test]
    fn download_marker_is_recorded() {
        let response = ViewResponse::new(StatusCode::OK).with_download("Report.xlsx");
        assert_eq!(response.download(), Some("Report.xlsx"));
    }
}
