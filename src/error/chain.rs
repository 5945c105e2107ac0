use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Cannot build a chain without handlers.")]
    Empty,
    #[error("Handler rejected the request: {message}")]
    Rejected { message: String },
    #[error("Stop index {stop_at} is out of range for {handlers} handlers.")]
    StopOutOfRange { stop_at: usize, handlers: usize },
}

impl ChainError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ChainError::Rejected {
            message: message.into(),
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;
