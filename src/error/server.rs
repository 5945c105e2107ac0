use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address '{value}': {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read local address: {source}")]
    LocalAddr {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to accept connection: {source}")]
    Accept {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}
