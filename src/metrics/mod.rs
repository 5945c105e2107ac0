//! Latency aggregation for load runs.
mod histogram;

pub use histogram::LatencyHistogram;
