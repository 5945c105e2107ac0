use http::Method;
use tracing::trace;

use crate::chain::{Handler, Next};
use crate::error::ChainResult;

use super::pipeline::Exchange;
use super::request::HttpRequest;
use super::response::HttpResponse;

/// Body served on `GET /`.
pub const GREETING: &str = "Jung jung";

type RouteFn = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;
type RewriteFn = Box<dyn Fn(&HttpRequest, HttpResponse) -> HttpResponse + Send + Sync>;

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route path such as `/echo/:message`.
#[derive(Debug)]
struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    fn parse(path: &str) -> Self {
        let segments = split_path(path)
            .into_iter()
            .map(|segment| {
                segment.strip_prefix(':').map_or_else(
                    || Segment::Literal(segment.to_owned()),
                    |name| Segment::Param(name.to_owned()),
                )
            })
            .collect();
        Self { segments }
    }

    /// Captured `:name` values when `path` fits this pattern.
    fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts = split_path(path);
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), part.to_owned())),
            }
        }
        Some(params)
    }
}

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: RouteFn,
}

enum Stage {
    Before(Box<dyn Handler<Exchange>>),
    After(RewriteFn),
}

/// Middleware bound to one path pattern, for any method.
///
/// Requests on other paths pass straight through to the next handler.
pub(super) struct PathMiddleware {
    pattern: PathPattern,
    stage: Stage,
}

impl PathMiddleware {
    pub(super) const fn is_before(&self) -> bool {
        matches!(self.stage, Stage::Before(_))
    }
}

impl Handler<Exchange> for PathMiddleware {
    fn handle(&self, exchange: &mut Exchange, next: Next<'_, Exchange>) -> ChainResult<()> {
        let Some(params) = self.pattern.captures(&exchange.request.path) else {
            return next.run(exchange);
        };
        match &self.stage {
            Stage::Before(handler) => {
                exchange.request.params = params.into_iter().collect();
                handler.handle(exchange, next)
            }
            Stage::After(rewrite) => {
                next.run(exchange)?;
                let response = exchange
                    .response
                    .take()
                    .unwrap_or_else(HttpResponse::not_found);
                exchange.response = Some(rewrite(&exchange.request, response));
                Ok(())
            }
        }
    }
}

/// Method + path routing. Routes are tried in registration order.
///
/// Path middleware registered with [`Router::before`] and [`Router::after`]
/// only takes effect once the router is turned into a pipeline with
/// [`build_pipeline`](super::build_pipeline).
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    middleware: Vec<PathMiddleware>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `GET /` greets, `POST /echo` returns the body, `GET /echo/:message`
    /// returns the path segment.
    #[must_use]
    pub fn default_routes() -> Self {
        Self::new()
            .route(Method::GET, "/", |_request| HttpResponse::text(GREETING))
            .route(Method::POST, "/echo", |request| {
                HttpResponse::text(request.body_text())
            })
            .route(Method::GET, "/echo/:message", |request| {
                HttpResponse::text(request.param("message").unwrap_or_default())
            })
    }

    /// Register `handler` for `method` on `path`. Segments starting with `:`
    /// match any single segment and are exposed through
    /// [`HttpRequest::param`].
    #[must_use]
    pub fn route<F>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(path),
            handler: Box::new(handler),
        });
        self
    }

    /// Run `handler` ahead of routing for requests on `path`. A handler that
    /// does not call `next` ends the request with whatever response it put in
    /// the exchange (404 when it set none); no route or `after` hook runs.
    #[must_use]
    pub fn before<H>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<Exchange> + 'static,
    {
        self.middleware.push(PathMiddleware {
            pattern: PathPattern::parse(path),
            stage: Stage::Before(Box::new(handler)),
        });
        self
    }

    /// Pass the routed response for requests on `path` through `rewrite`.
    /// Hooks on the same path apply in registration order.
    #[must_use]
    pub fn after<F>(mut self, path: &str, rewrite: F) -> Self
    where
        F: Fn(&HttpRequest, HttpResponse) -> HttpResponse + Send + Sync + 'static,
    {
        self.middleware.push(PathMiddleware {
            pattern: PathPattern::parse(path),
            stage: Stage::After(Box::new(rewrite)),
        });
        self
    }

    /// Append all routes and middleware of `other` after the existing ones.
    #[must_use]
    pub fn nest(mut self, other: Router) -> Self {
        self.routes.extend(other.routes);
        self.middleware.extend(other.middleware);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Detach the path middleware, leaving only the routes.
    pub(super) fn take_middleware(&mut self) -> Vec<PathMiddleware> {
        std::mem::take(&mut self.middleware)
    }

    /// Dispatch to the first matching route, or answer 404.
    pub fn handle(&self, request: &mut HttpRequest) -> HttpResponse {
        for route in &self.routes {
            if route.method != request.method {
                continue;
            }
            if let Some(params) = route.pattern.captures(&request.path) {
                trace!(path = %request.path, "route matched");
                request.params = params.into_iter().collect();
                return (route.handler)(request);
            }
        }
        HttpResponse::not_found()
    }
}

/// `/a//b/` and `a/b` both split into `["a", "b"]`; the root is empty.
fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.trim().is_empty())
        .collect()
}
