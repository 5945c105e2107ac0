use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, trace, warn};

use crate::chain::Chain;
use crate::error::{AppError, AppResult, ServerError};
use crate::shutdown::ShutdownReceiver;

use super::pipeline::{Exchange, build_pipeline};
use super::request::read_request_within;
use super::response::HttpResponse;
use super::router::Router;

/// Parse `host:port` where host is an IP literal.
///
/// # Errors
///
/// Returns an error when the value is not a socket address.
pub fn parse_listen_addr(value: &str) -> Result<SocketAddr, ServerError> {
    value
        .trim()
        .parse()
        .map_err(|source| ServerError::InvalidListenAddr {
            value: value.to_owned(),
            source,
        })
}

/// How long a connection may take to deliver its request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    pipeline: Arc<Chain<Exchange>>,
    read_timeout: Duration,
}

impl Server {
    /// Bind `addr` and prepare the request pipeline around `router`.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound.
    pub async fn bind(addr: SocketAddr, router: Router) -> AppResult<Self> {
        let pipeline = build_pipeline(router)?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AppError::server(ServerError::Bind { addr, source }))?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| AppError::server(ServerError::LocalAddr { source }))?;
        Ok(Self {
            listener,
            local_addr,
            pipeline: Arc::new(pipeline),
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Replace [`DEFAULT_READ_TIMEOUT`].
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until a shutdown signal arrives. Accept errors are
    /// logged and the loop keeps going.
    pub async fn run(self, mut shutdown_rx: ShutdownReceiver) {
        info!("Listening on {}", self.local_addr);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down listener on {}", self.local_addr);
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            trace!(%peer, "accepted connection");
                            let pipeline = Arc::clone(&self.pipeline);
                            tokio::spawn(handle_connection(socket, pipeline, self.read_timeout));
                        }
                        Err(err) => warn!("{}", ServerError::Accept { source: err }),
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    pipeline: Arc<Chain<Exchange>>,
    read_timeout: Duration,
) {
    let response = match read_request_within(&mut socket, read_timeout).await {
        Ok(request) => respond(&pipeline, Exchange::new(request)),
        Err(reject) => {
            warn!("Rejected request: {}", reject.message);
            HttpResponse::with_status(reject.status).body(reject.message)
        }
    };

    if let Err(err) = response.write_to(&mut socket).await {
        warn!(
            "{}",
            ServerError::Io {
                context: "write response",
                source: err,
            }
        );
        return;
    }
    if let Err(err) = socket.shutdown().await {
        trace!("Socket shutdown failed: {}", err);
    }
}

fn respond(pipeline: &Chain<Exchange>, exchange: Exchange) -> HttpResponse {
    match pipeline.handle(exchange) {
        Ok(exchange) => exchange.into_response(),
        Err(err) => {
            error!("Request pipeline failed: {}", err);
            HttpResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR).body(err.to_string())
        }
    }
}
