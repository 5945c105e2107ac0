use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request {index} failed: {cause}")]
    TaskFailed {
        index: usize,
        /// `source` and its nested causes, joined with `: `.
        cause: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request {index} returned status {status}, expected {expected}.")]
    UnexpectedStatus {
        index: usize,
        status: u16,
        expected: u16,
    },
    #[error("Request task was aborted: {source}")]
    TaskAborted {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("{failed} of {total} requests failed; first failure: {first}")]
    TasksFailed {
        failed: usize,
        total: usize,
        first: Box<HttpError>,
    },
    #[error("Request {index} timed out after {timeout:?}.")]
    TimedOut { index: usize, timeout: Duration },
    #[error("Concurrency limiter closed before request {index} started: {source}")]
    LimiterClosed {
        index: usize,
        #[source]
        source: tokio::sync::AcquireError,
    },
    #[error("Failed to print body of request {index}: {source}")]
    PrintBody {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create latency histogram: {message}")]
    Histogram { message: String },
}

impl HttpError {
    /// Index of the task that caused this error, if any.
    #[must_use]
    pub fn task_index(&self) -> Option<usize> {
        match self {
            HttpError::TaskFailed { index, .. }
            | HttpError::UnexpectedStatus { index, .. }
            | HttpError::TimedOut { index, .. }
            | HttpError::LimiterClosed { index, .. }
            | HttpError::PrintBody { index, .. } => Some(*index),
            HttpError::TasksFailed { first, .. } => first.task_index(),
            HttpError::InvalidUrl { .. }
            | HttpError::UnsupportedScheme { .. }
            | HttpError::BuildClientFailed { .. }
            | HttpError::TaskAborted { .. }
            | HttpError::Histogram { .. } => None,
        }
    }
}
