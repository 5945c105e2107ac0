//! Minimal HTTP/1.1 target server for local load runs.
//!
//! Every connection carries one request. The request is wrapped in an
//! [`Exchange`] and pushed through a handler [`Chain`](crate::chain::Chain):
//! an access log first, then the [`Router`].
mod listener;
mod pipeline;
mod request;
mod response;
mod router;

#[cfg(test)]
mod tests;

pub use listener::{DEFAULT_READ_TIMEOUT, Server, parse_listen_addr};
pub use pipeline::{Exchange, build_pipeline};
pub use request::{HttpRequest, RequestReject, read_request, read_request_within};
pub use response::HttpResponse;
pub use router::{GREETING, Router};
