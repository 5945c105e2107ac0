//! Ordered handler chains.
//!
//! A [`Chain`] owns an ordered list of handlers. Running it calls handler 0
//! with a [`Next`] continuation; each handler decides whether to call
//! [`Next::run`] to hand control to the following handler. The continuation
//! past the last handler is a no-op.
mod builder;
mod counting;
mod next;


pub use builder::{Chain, ChainBuilder};
pub use counting::{CountingRequest, counting_chain, halt, increment};
pub use next::{Handler, Next, from_fn};
