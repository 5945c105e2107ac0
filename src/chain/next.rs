use tracing::trace;

use crate::error::ChainResult;

/// A unit of request processing that may delegate to the rest of the chain.
pub trait Handler<Req>: Send + Sync {
    /// Handle `req`, optionally calling `next.run(req)` to continue.
    ///
    /// # Errors
    ///
    /// Returns the error raised by this handler or by any handler it
    /// delegated to.
    fn handle(&self, req: &mut Req, next: Next<'_, Req>) -> ChainResult<()>;
}

impl<Req, F> Handler<Req> for F
where
    F: Fn(&mut Req, Next<'_, Req>) -> ChainResult<()> + Send + Sync,
{
    fn handle(&self, req: &mut Req, next: Next<'_, Req>) -> ChainResult<()> {
        self(req, next)
    }
}

/// Pins a closure to the handler signature so argument types can be inferred.
pub const fn from_fn<Req, F>(handler: F) -> F
where
    F: Fn(&mut Req, Next<'_, Req>) -> ChainResult<()> + Send + Sync,
{
    handler
}

/// Continuation handed to each handler.
///
/// `run` consumes the continuation, so a handler can delegate at most once.
pub struct Next<'chain, Req> {
    handlers: &'chain [Box<dyn Handler<Req>>],
    cursor: usize,
}

impl<'chain, Req> Next<'chain, Req> {
    pub(super) const fn new(handlers: &'chain [Box<dyn Handler<Req>>], cursor: usize) -> Self {
        Self { handlers, cursor }
    }

    /// A continuation that does nothing when run.
    #[must_use]
    pub const fn noop() -> Self {
        Self {
            handlers: &[],
            cursor: 0,
        }
    }

    /// Invoke the handler at the cursor, or return immediately past the end.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised downstream, unchanged.
    pub fn run(self, req: &mut Req) -> ChainResult<()> {
        let Some(handler) = self.handlers.get(self.cursor) else {
            trace!(cursor = self.cursor, "chain exhausted");
            return Ok(());
        };
        trace!(index = self.cursor, "invoking handler");
        let following = Next::new(self.handlers, self.cursor.saturating_add(1));
        handler.handle(req, following)
    }

    /// Number of handlers this continuation would still reach.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.handlers.len().saturating_sub(self.cursor)
    }
}
