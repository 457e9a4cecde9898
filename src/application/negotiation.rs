//! Content negotiation for alternate view representations.
//!
//! A [`DetectorRegistry`] holds named request detectors; a [`RequestHandler`]
//! component maps a detector name to the [`ViewClass`] that renders it. Both
//! are assembled once at startup into a [`Negotiation`] and shared read-only
//! afterwards.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Uri, header::ACCEPT};
use tracing::debug;

use crate::domain::representation::{SPREADSHEET_EXTENSION, SPREADSHEET_MEDIA_TYPE};

/// Request parameter carrying the routed extension.
pub const EXTENSION_PARAM: &str = "_ext";

/// View implementation selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewClass {
    #[default]
    Html,
    Spreadsheet,
}

/// Rule matching a request by `Accept` media type or by a request parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detector {
    accept: Vec<String>,
    param: String,
    value: String,
}

impl Detector {
    pub fn new(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            accept: Vec::new(),
            param: param.into(),
            value: value.into(),
        }
    }

    pub fn with_accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn matches(&self, headers: &HeaderMap, uri: &Uri) -> bool {
        self.matches_accept(headers) || self.matches_param(uri)
    }

    fn matches_accept(&self, headers: &HeaderMap) -> bool {
        if self.accept.is_empty() {
            return false;
        }

        headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|entry| entry.split(';').next().unwrap_or("").trim())
            .any(|media| {
                self.accept
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(media))
            })
    }

    fn matches_param(&self, uri: &Uri) -> bool {
        request_param(uri, &self.param).is_some_and(|value| value == self.value)
    }
}

/// Read a request parameter from the query string.
///
/// The extension parameter falls back to the extension of the last path
/// segment, so `/sales/q1.xlsx` carries `_ext=xlsx`.
pub fn request_param(uri: &Uri, name: &str) -> Option<String> {
    let from_query = uri.query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    });

    if from_query.is_some() || name != EXTENSION_PARAM {
        return from_query;
    }

    path_extension(uri.path()).map(str::to_string)
}

fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, extension) = segment.rsplit_once('.')?;
    (!stem.is_empty() && !extension.is_empty()).then_some(extension)
}

/// Ordered set of named detectors.
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<(String, Detector)>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detector under `name`. Returns `false` when the name is
    /// already taken; the existing rule is kept.
    pub fn add(&mut self, name: impl Into<String>, detector: Detector) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.detectors.push((name, detector));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Detector> {
        self.detectors
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, detector)| detector)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Whether the detector registered as `name` matches the request.
    pub fn is(&self, name: &str, headers: &HeaderMap, uri: &Uri) -> bool {
        self.get(name)
            .is_some_and(|detector| detector.matches(headers, uri))
    }

    /// Names of all detectors matching the request, in registration order.
    pub fn matching<'a>(
        &'a self,
        headers: &'a HeaderMap,
        uri: &'a Uri,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.detectors
            .iter()
            .filter(move |(_, detector)| detector.matches(headers, uri))
            .map(|(name, _)| name.as_str())
    }
}

/// Request-handling component that picks a view class per representation token.
#[derive(Debug, Clone, Default)]
pub struct RequestHandler {
    view_class_map: BTreeMap<String, ViewClass>,
}

impl RequestHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view_class(&mut self, token: impl Into<String>, class: ViewClass) {
        self.view_class_map.insert(token.into(), class);
    }

    pub fn view_class(&self, token: &str) -> Option<ViewClass> {
        self.view_class_map.get(token).copied()
    }

    pub fn view_class_map(&self) -> &BTreeMap<String, ViewClass> {
        &self.view_class_map
    }
}

/// Components made available to the hook when the host initializes its handlers.
#[derive(Debug, Clone, Default)]
pub struct ControllerComponents {
    pub request_handler: Option<RequestHandler>,
}

impl ControllerComponents {
    pub fn with_request_handler() -> Self {
        Self {
            request_handler: Some(RequestHandler::new()),
        }
    }
}

/// Register the spreadsheet detector. Safe to call more than once.
pub fn bootstrap(detectors: &mut DetectorRegistry) {
    let detector = Detector::new(EXTENSION_PARAM, SPREADSHEET_EXTENSION)
        .with_accept(SPREADSHEET_MEDIA_TYPE);
    if detectors.add(SPREADSHEET_EXTENSION, detector) {
        debug!(
            target = "sheetview::negotiation",
            detector = SPREADSHEET_EXTENSION,
            "registered request detector"
        );
    }
}

/// Map the spreadsheet token to its view when a request handler is present.
pub fn on_controller_initialize(components: &mut ControllerComponents) {
    if let Some(handler) = components.request_handler.as_mut() {
        handler.set_view_class(SPREADSHEET_EXTENSION, ViewClass::Spreadsheet);
    }
}

/// Startup-built negotiation rules, read-only once the server is running.
#[derive(Debug, Clone, Default)]
pub struct Negotiation {
    detectors: DetectorRegistry,
    components: ControllerComponents,
}

impl Negotiation {
    pub fn new(detectors: DetectorRegistry, components: ControllerComponents) -> Self {
        Self {
            detectors,
            components,
        }
    }

    /// Detector and view mapping for the spreadsheet representation.
    pub fn with_spreadsheet_support() -> Self {
        let mut detectors = DetectorRegistry::new();
        bootstrap(&mut detectors);
        let mut components = ControllerComponents::with_request_handler();
        on_controller_initialize(&mut components);
        Self::new(detectors, components)
    }

    pub fn detectors(&self) -> &DetectorRegistry {
        &self.detectors
    }

    pub fn components(&self) -> &ControllerComponents {
        &self.components
    }

    /// Pick the view class for a request. Falls back to HTML when no detector
    /// matches or no request handler maps the matching token.
    pub fn resolve(&self, headers: &HeaderMap, uri: &Uri) -> ViewClass {
        let Some(handler) = self.components.request_handler.as_ref() else {
            return ViewClass::Html;
        };

        self.detectors
            .matching(headers, uri)
            .find_map(|name| handler.view_class(name))
            .unwrap_or_default()
    }
}
