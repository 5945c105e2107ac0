use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONTENT_TYPE, DEFAULT_HANDLER_COUNT, DEFAULT_LISTEN_ADDR, DEFAULT_REQUEST_COUNT,
};
use super::parsers::{parse_duration_arg, parse_positive_usize, parse_status_code};
use super::types::{FailurePolicy, HttpMethod, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Compose handler chains, fire concurrent HTTP requests, and serve a local echo target."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to config file (TOML or JSON); defaults to ./chainload.toml or ./chainload.json
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the counting handler chain and print the final request as JSON
    Chain(ChainArgs),
    /// Fire concurrent HTTP requests and report the elapsed time
    Stress(StressArgs),
    /// Serve the local target (GET / and POST /echo)
    Serve(ServeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ChainArgs {
    /// Number of incrementing handlers in the chain
    #[arg(long, default_value_t = DEFAULT_HANDLER_COUNT)]
    pub handlers: usize,

    /// Zero-based index of a handler that stops the chain instead of continuing
    #[arg(long = "stop-at")]
    pub stop_at: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct StressArgs {
    /// Target URL (defaults to http://localhost:4221, or /echo with --echo)
    #[arg(long, short, env = "CHAINLOAD_URL")]
    pub url: Option<String>,

    /// Number of concurrent requests to fire
    #[arg(
        long = "requests",
        short = 'n',
        env = "CHAINLOAD_COUNT",
        default_value_t = DEFAULT_REQUEST_COUNT
    )]
    pub count: usize,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Request body (POST only)
    #[arg(long, short)]
    pub data: Option<String>,

    /// Content-Type header sent with a body
    #[arg(long = "content-type", short = 'T', default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// POST "Young john" to the echo endpoint
    #[arg(long, conflicts_with_all = ["data", "method"])]
    pub echo: bool,

    /// Cap on requests in flight at once (unbounded when unset)
    #[arg(long = "max-in-flight", value_parser = parse_positive_usize)]
    pub max_in_flight: Option<PositiveUsize>,

    /// Per-request timeout (supports ms/s/m/h); no timeout when unset
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Treat any other response status as a failure
    #[arg(long = "expect-status", value_parser = parse_status_code)]
    pub expect_status: Option<u16>,

    /// What to do when a request fails
    #[arg(long = "failure-policy", value_enum, default_value_t = FailurePolicy::FailFast)]
    pub failure_policy: FailurePolicy,

    /// Do not print response bodies
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on (ip:port)
    #[arg(long, short = 'l', default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,
}
