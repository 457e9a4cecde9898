//! Output representations a handler can be rendered as.

/// Media type of an OOXML spreadsheet package.
pub const SPREADSHEET_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Extension token that selects the spreadsheet representation.
pub const SPREADSHEET_EXTENSION: &str = "xlsx";
pub const HTML_EXTENSION: &str = "html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    #[default]
    Html,
    Spreadsheet,
}

impl Representation {
    pub fn token(self) -> &'static str {
        match self {
            Representation::Html => HTML_EXTENSION,
            Representation::Spreadsheet => SPREADSHEET_EXTENSION,
        }
    }
}
