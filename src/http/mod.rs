//! Concurrent HTTP load generation.
mod client;
mod plan;
mod report;
mod stress;


pub use client::build_client;
pub use plan::{StressPlan, parse_target_url};
pub use report::{StressReport, TaskOutcome};
pub use stress::run_stress;
