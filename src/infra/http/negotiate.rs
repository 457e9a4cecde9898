use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::application::negotiation::Negotiation;

/// Resolve the view class for the request and store it in the request extensions.
pub async fn negotiate_view(
    State(negotiation): State<Arc<Negotiation>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let class = negotiation.resolve(request.headers(), request.uri());
    debug!(
        target = "sheetview::http::negotiation",
        path = %request.uri().path(),
        view = ?class,
        "negotiated view class"
    );
    request.extensions_mut().insert(class);
    next.run(request).await
}
