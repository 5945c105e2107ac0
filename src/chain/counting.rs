use serde::Serialize;

use crate::error::{ChainError, ChainResult};

use super::builder::{Chain, ChainBuilder};
use super::next::Next;

/// Request carried through the demo chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountingRequest {
    pub count: u64,
}

/// Bump the counter, then continue.
///
/// # Errors
///
/// Propagates errors from downstream handlers.
pub fn increment(req: &mut CountingRequest, next: Next<'_, CountingRequest>) -> ChainResult<()> {
    req.count = req.count.saturating_add(1);
    next.run(req)
}

/// Stop the chain here without touching the request.
///
/// # Errors
///
/// Never fails.
pub fn halt(_req: &mut CountingRequest, next: Next<'_, CountingRequest>) -> ChainResult<()> {
    drop(next);
    Ok(())
}

/// Build `handlers` incrementing handlers, with [`halt`] at `stop_at` if given.
///
/// # Errors
///
/// Returns an error when `handlers` is zero or `stop_at` is out of range.
pub fn counting_chain(
    handlers: usize,
    stop_at: Option<usize>,
) -> ChainResult<Chain<CountingRequest>> {
    if let Some(stop_at) = stop_at
        && stop_at >= handlers
    {
        return Err(ChainError::StopOutOfRange { stop_at, handlers });
    }

    let mut builder = ChainBuilder::new();
    for index in 0..handlers {
        if stop_at == Some(index) {
            builder.push(halt);
        } else {
            builder.push(increment);
        }
    }
    builder.build()
}
