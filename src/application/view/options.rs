use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

/// Template path that marks the framework error page.
pub const ERROR_TEMPLATE_PATH: &str = "Error";
pub const DEFAULT_TEMPLATE: &str = "index";
pub const DEFAULT_LAYOUT: &str = "default";

/// View variable naming the download file explicitly (without extension).
pub const FILENAME_VAR: &str = "_filename";

/// Request facts a view needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub path: String,
}

impl ViewRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Named values exposed to template logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewVars(Map<String, Value>);

impl ViewVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Serialize `value` and store it under `name`.
    pub fn set_serialized<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.0.insert(name.into(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Construction options for a view.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub template_path: Option<String>,
    pub template: String,
    pub layout: Option<String>,
    pub auto_layout: bool,
    pub status: StatusCode,
    pub vars: ViewVars,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            template_path: None,
            template: DEFAULT_TEMPLATE.to_string(),
            layout: Some(DEFAULT_LAYOUT.to_string()),
            auto_layout: true,
            status: StatusCode::OK,
            vars: ViewVars::new(),
        }
    }
}

impl ViewOptions {
    pub fn new(template_path: impl Into<String>) -> Self {
        Self {
            template_path: Some(template_path.into()),
            ..Self::default()
        }
    }

    /// Options for rendering the error page template `name` with `status`.
    pub fn error(name: impl Into<String>, status: StatusCode) -> Self {
        Self::new(ERROR_TEMPLATE_PATH)
            .with_template(name)
            .with_status(status)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.auto_layout = false;
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.set(name, value);
        self
    }

    pub fn with_vars(mut self, vars: ViewVars) -> Self {
        self.vars = vars;
        self
    }

    pub fn is_error_page(&self) -> bool {
        self.template_path.as_deref() == Some(ERROR_TEMPLATE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_options_target_the_error_path() {
        let options = ViewOptions::error("not_found", StatusCode::NOT_FOUND);
        assert!(options.is_error_page());
        assert_eq!(options.template, "not_found");
        assert_eq!(options.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn vars_accept_serializable_values() {
        #[derive(Serialize)]
        struct Row {
            region: &'static str,
        }

        let mut vars = ViewVars::new();
        vars.set_serialized("row", &Row { region: "North" })
            .expect("serializable");
        vars.set(FILENAME_VAR, "Report");

        assert_eq!(vars.len(), 2);
        assert_eq!(
            vars.get("row").and_then(|row| row.get("region")),
            Some(&Value::from("North"))
        );
        assert!(vars.contains(FILENAME_VAR));
    }
}
