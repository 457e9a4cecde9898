mod download;
mod middleware;
mod negotiate;
mod public;

pub use download::{content_disposition, render_response};
pub use middleware::{RequestContext, log_responses, set_request_context};
pub use negotiate::negotiate_view;
pub use public::{HttpState, build_router};
