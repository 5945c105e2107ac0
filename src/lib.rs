//! Core library for the `chainload` CLI.
//!
//! The crate provides a synchronous handler chain (ordered handlers that each
//! decide whether to continue), a concurrent HTTP load generator, and a small
//! HTTP/1.1 target server whose request pipeline is itself a handler chain.
//! The primary user-facing interface is the `chainload` command-line
//! application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod server;
pub mod shutdown;
