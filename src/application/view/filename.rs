use serde_json::Value;

use crate::domain::slug::derive_slug;

pub const XLSX_SUFFIX: &str = ".xlsx";
const FALLBACK_STEM: &str = "download";

/// Compute the download name for a spreadsheet response.
///
/// An explicit name wins and only gains the extension. Otherwise the request
/// path, minus any `.xlsx`, is slugged; a path with nothing sluggable falls
/// back to `download.xlsx`.
pub fn download_filename(explicit: Option<&Value>, path: &str) -> String {
    if let Some(name) = explicit.and_then(explicit_stem) {
        return format!("{name}{XLSX_SUFFIX}");
    }

    let stem = derive_slug(&path.replace(XLSX_SUFFIX, ""))
        .unwrap_or_else(|_| FALLBACK_STEM.to_string());
    format!("{stem}{XLSX_SUFFIX}")
}

fn explicit_stem(value: &Value) -> Option<String> {
    let stem = match value {
        Value::String(name) => name.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!stem.is_empty()).then_some(stem)
}
