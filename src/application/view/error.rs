use axum::http::StatusCode;
use thiserror::Error;

use crate::application::error::HttpError;

use super::{encoder::EncodeError, template::TemplateError};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no `{format}` writer is available")]
    EncoderUnavailable { format: String },
    #[error("spreadsheet not found: this view never allocated a workbook")]
    WorkbookNotAllocated,
    #[error(transparent)]
    Template(TemplateError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl From<TemplateError> for ViewError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::WorkbookNotAllocated => ViewError::WorkbookNotAllocated,
            other => ViewError::Template(other),
        }
    }
}

impl From<ViewError> for HttpError {
    fn from(error: ViewError) -> Self {
        let public_message = match &error {
            ViewError::EncoderUnavailable { .. } => "Spreadsheet writer unavailable",
            ViewError::WorkbookNotAllocated => "Spreadsheet not available",
            ViewError::Template(_) => "Template rendering failed",
            ViewError::Encode(_) => "Spreadsheet encoding failed",
        };

        HttpError::from_error(
            "application::view::render",
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}
