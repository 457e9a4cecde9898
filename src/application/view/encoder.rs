//! Workbook serialization seam.
//!
//! Views never touch the OOXML layout themselves; they ask a [`WriterFactory`]
//! for a [`SheetWriter`] bound to their workbook and let it write the package.

use std::io::{self, Write};

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

/// Writer format name for OOXML spreadsheet packages.
pub const XLSX_FORMAT: &str = "Xlsx";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("workbook serialization failed: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("failed to write workbook bytes: {0}")]
    Io(#[from] io::Error),
    #[error("writer option `{option}` is not supported by this backend")]
    UnsupportedOption { option: &'static str },
}

/// Serializes one workbook to a byte sink.
pub trait SheetWriter {
    fn set_pre_calculate_formulas(&mut self, enabled: bool);

    fn set_include_charts(&mut self, enabled: bool);

    fn save(&mut self, sink: &mut dyn Write) -> Result<(), EncodeError>;
}

/// Produces writers for named formats; `None` means the format is not available.
pub trait WriterFactory: Send + Sync {
    fn create_writer<'a>(
        &self,
        workbook: &'a mut Workbook,
        format: &str,
    ) -> Option<Box<dyn SheetWriter + 'a>>;
}

/// Factory backed by `rust_xlsxwriter`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriterFactory;

impl WriterFactory for XlsxWriterFactory {
    fn create_writer<'a>(
        &self,
        workbook: &'a mut Workbook,
        format: &str,
    ) -> Option<Box<dyn SheetWriter + 'a>> {
        if !format.eq_ignore_ascii_case(XLSX_FORMAT) {
            return None;
        }
        Some(Box::new(XlsxPackageWriter::new(workbook)))
    }
}

/// Writes an `.xlsx` package.
///
/// Formulas are stored without cached results and inserted charts are always
/// kept, so only `pre_calculate_formulas = false` and `include_charts = true`
/// can be saved. Both options start in the unsupported state.
pub struct XlsxPackageWriter<'a> {
    workbook: &'a mut Workbook,
    pre_calculate_formulas: bool,
    include_charts: bool,
}

impl<'a> XlsxPackageWriter<'a> {
    pub fn new(workbook: &'a mut Workbook) -> Self {
        Self {
            workbook,
            pre_calculate_formulas: true,
            include_charts: false,
        }
    }
}

impl SheetWriter for XlsxPackageWriter<'_> {
    fn set_pre_calculate_formulas(&mut self, enabled: bool) {
        self.pre_calculate_formulas = enabled;
    }

    fn set_include_charts(&mut self, enabled: bool) {
        self.include_charts = enabled;
    }

    fn save(&mut self, sink: &mut dyn Write) -> Result<(), EncodeError> {
        if self.pre_calculate_formulas {
            return Err(EncodeError::UnsupportedOption {
                option: "pre_calculate_formulas",
            });
        }
        if !self.include_charts {
            return Err(EncodeError::UnsupportedOption {
                option: "include_charts",
            });
        }

        let buffer = self.workbook.save_to_buffer()?;
        sink.write_all(&buffer)?;
        sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_has_no_writer() {
        let mut workbook = Workbook::new();
        assert!(
            XlsxWriterFactory
                .create_writer(&mut workbook, "Ods")
                .is_none()
        );
    }

    #[test]
    fn default_options_are_rejected() {
        let mut workbook = Workbook::new();
        let mut writer = XlsxWriterFactory
            .create_writer(&mut workbook, XLSX_FORMAT)
            .expect("xlsx writer");
        let mut sink = Vec::new();
        let err = writer.save(&mut sink).expect_err("precalculation unsupported");
        assert!(matches!(
            err,
            EncodeError::UnsupportedOption {
                option: "pre_calculate_formulas"
            }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn supported_options_write_a_zip_package() {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .write_string(0, 0, "hello")
            .expect("cell write");

        let mut writer = XlsxWriterFactory
            .create_writer(&mut workbook, "xlsx")
            .expect("xlsx writer");
        writer.set_pre_calculate_formulas(false);
        writer.set_include_charts(true);

        let mut sink = Vec::new();
        writer.save(&mut sink).expect("saved");
        assert!(sink.starts_with(b"PK\x03\x04"));
    }
}
