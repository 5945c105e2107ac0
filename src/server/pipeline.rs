use std::time::Instant;

use tracing::debug;

use crate::chain::{Chain, ChainBuilder, Next, from_fn};
use crate::error::ChainResult;

use super::request::HttpRequest;
use super::response::HttpResponse;
use super::router::{PathMiddleware, Router};

/// One request and the response produced for it so far.
#[derive(Debug)]
pub struct Exchange {
    pub request: HttpRequest,
    pub response: Option<HttpResponse>,
}

impl Exchange {
    #[must_use]
    pub const fn new(request: HttpRequest) -> Self {
        Self {
            request,
            response: None,
        }
    }

    /// The produced response, or 404 when no handler produced one.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        self.response.unwrap_or_else(HttpResponse::not_found)
    }
}

fn access_log(exchange: &mut Exchange, next: Next<'_, Exchange>) -> ChainResult<()> {
    let started = Instant::now();
    let result = next.run(exchange);
    let status = exchange
        .response
        .as_ref()
        .map_or(0, |response| response.status().as_u16());
    debug!(
        method = %exchange.request.method,
        path = %exchange.request.path,
        status,
        elapsed_us = started.elapsed().as_micros(),
        "handled request"
    );
    result
}

/// Access log, then `before` hooks, then `after` hooks, then `router`.
///
/// `after` hooks sit in reverse registration order so that, as they unwind,
/// the first registered rewrites the response first.
///
/// # Errors
///
/// Never fails in practice; the chain always has at least two handlers.
pub fn build_pipeline(mut router: Router) -> ChainResult<Chain<Exchange>> {
    let (before, mut after): (Vec<_>, Vec<_>) = router
        .take_middleware()
        .into_iter()
        .partition(PathMiddleware::is_before);
    after.reverse();

    let mut builder = ChainBuilder::new();
    builder.push(access_log);
    for hook in before.into_iter().chain(after) {
        builder.push(hook);
    }
    builder.push(from_fn(
        move |exchange: &mut Exchange, next: Next<'_, Exchange>| {
            exchange.response = Some(router.handle(&mut exchange.request));
            next.run(exchange)
        },
    ));
    builder.build()
}
