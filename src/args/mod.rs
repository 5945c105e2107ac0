//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{ChainArgs, CliArgs, Command, ServeArgs, StressArgs};
pub use defaults::{
    DEFAULT_CONTENT_TYPE, DEFAULT_HANDLER_COUNT, DEFAULT_LISTEN_ADDR, DEFAULT_REQUEST_COUNT,
    DEFAULT_TARGET_URL, ECHO_BODY, ECHO_TARGET_URL,
};
pub use types::{FailurePolicy, HttpMethod, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
