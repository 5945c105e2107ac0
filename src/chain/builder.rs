use std::fmt;

use tracing::debug;

use crate::error::{ChainError, ChainResult};

use super::next::{Handler, Next};

/// Collects handlers in the order they should run.
pub struct ChainBuilder<Req> {
    handlers: Vec<Box<dyn Handler<Req>>>,
}

impl<Req> Default for ChainBuilder<Req> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<Req> ChainBuilder<Req> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler after those already added.
    #[must_use]
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: Handler<Req> + 'static,
    {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append a handler in place; handy when building in a loop.
    pub fn push<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<Req> + 'static,
    {
        self.handlers.push(Box::new(handler));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Freeze the handler list into a runnable chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Empty`] when no handler was added.
    pub fn build(self) -> ChainResult<Chain<Req>> {
        if self.handlers.is_empty() {
            return Err(ChainError::Empty);
        }
        Ok(Chain {
            handlers: self.handlers.into_boxed_slice(),
        })
    }
}

/// A composed, reusable handler pipeline.
pub struct Chain<Req> {
    handlers: Box<[Box<dyn Handler<Req>>]>,
}

impl<Req> Chain<Req> {
    /// Run every handler in order against `req`, as far as the handlers allow.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a handler; nothing after it runs.
    pub fn run(&self, req: &mut Req) -> ChainResult<()> {
        debug!(handlers = self.handlers.len(), "running chain");
        Next::new(&self.handlers, 0).run(req)
    }

    /// Move `req` through the chain and hand it back.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a handler.
    pub fn handle(&self, mut req: Req) -> ChainResult<Req> {
        self.run(&mut req)?;
        Ok(req)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<Req> fmt::Debug for Chain<Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
