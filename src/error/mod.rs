mod app;
mod chain;
mod config;
mod http;
mod server;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use chain::{ChainError, ChainResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use server::ServerError;
pub use validation::ValidationError;
