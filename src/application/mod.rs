//! Application layer: content negotiation, views and the bundled report templates.

pub mod error;
pub mod negotiation;
pub mod reports;
pub mod view;
